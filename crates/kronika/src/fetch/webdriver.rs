// ABOUTME: Browser-backed page fetcher driving a WebDriver endpoint through fantoccini.
// ABOUTME: Renders JavaScript, waits for readiness selectors and scrolls to trigger lazy loading.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::fetch::{Navigation, PageFetcher, PageSession};

/// Chromedriver's default listen address.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

const SCROLL_PAUSE: Duration = Duration::from_millis(400);

/// Opens one browser session per extraction on a running WebDriver service.
#[derive(Debug, Clone)]
pub struct WebDriverFetcher {
    endpoint: String,
    headless: bool,
    user_agent: Option<String>,
}

impl WebDriverFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headless: true,
            user_agent: None,
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = vec![json!("--no-sandbox")];
        if self.headless {
            args.push(json!("--headless"));
            args.push(json!("--disable-gpu"));
        }
        if let Some(ua) = &self.user_agent {
            args.push(json!(format!("--user-agent={}", ua)));
        }

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }
}

impl Default for WebDriverFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_WEBDRIVER_URL)
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn open(&self) -> Result<Box<dyn PageSession>, ExtractError> {
        let client = ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.endpoint)
            .await
            .map_err(|e| {
                ExtractError::session(
                    &self.endpoint,
                    "Open",
                    Some(anyhow::anyhow!("webdriver session failed: {}", e)),
                )
            })?;
        Ok(Box::new(WebDriverSession {
            client: Some(client),
            url: String::new(),
        }))
    }
}

struct WebDriverSession {
    client: Option<Client>,
    url: String,
}

impl WebDriverSession {
    fn client(&self, op: &str) -> Result<&Client, ExtractError> {
        self.client.as_ref().ok_or_else(|| {
            ExtractError::session(&self.url, op, Some(anyhow::anyhow!("session closed")))
        })
    }
}

#[async_trait]
impl PageSession for WebDriverSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<Navigation, ExtractError> {
        self.url = url.to_string();
        let client = self.client("Goto")?;
        match tokio::time::timeout(timeout, client.goto(url)).await {
            Ok(Ok(())) => Ok(Navigation::Loaded),
            Ok(Err(e)) => {
                warn!(url, error = %e, "navigation failed");
                Ok(Navigation::NoResponse)
            }
            Err(_) => Err(ExtractError::timeout(
                url,
                "Goto",
                Some(anyhow::anyhow!("navigation exceeded {:?}", timeout)),
            )),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selectors: &[String],
        timeout: Duration,
    ) -> Result<(), ExtractError> {
        if selectors.is_empty() {
            return Ok(());
        }
        let joined = selectors.join(", ");
        let client = self.client("WaitForSelector")?;
        client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(&joined))
            .await
            .map(|_| ())
            .map_err(|e| {
                ExtractError::timeout(
                    &self.url,
                    "WaitForSelector",
                    Some(anyhow::anyhow!("{} not found: {}", joined, e)),
                )
            })
    }

    async fn lazy_load(&mut self, passes: u32) -> Result<(), ExtractError> {
        let client = self.client("LazyLoad")?;
        for pass in 0..passes {
            client
                .execute("window.scrollBy(0, window.innerHeight);", vec![])
                .await
                .map_err(|e| {
                    ExtractError::session(&self.url, "LazyLoad", Some(anyhow::anyhow!("{}", e)))
                })?;
            debug!(url = %self.url, pass, "scrolled");
            tokio::time::sleep(SCROLL_PAUSE).await;
        }
        Ok(())
    }

    async fn content(&mut self) -> Result<String, ExtractError> {
        let client = self.client("Content")?;
        client.source().await.map_err(|e| {
            ExtractError::session(&self.url, "Content", Some(anyhow::anyhow!("{}", e)))
        })
    }

    async fn close(&mut self) -> Result<(), ExtractError> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        client.close().await.map_err(|e| {
            ExtractError::session(&self.url, "Close", Some(anyhow::anyhow!("{}", e)))
        })
    }
}
