// ABOUTME: Plain HTTP page fetcher with SSRF protection, content-length limits, and charset decoding.
// ABOUTME: Implements PageFetcher over reqwest; no JavaScript runs, so readiness is checked once.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::fetch::{contains_any, Navigation, PageFetcher, PageSession};

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Desktop Chrome user agent; several publishers serve stripped pages to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static PRIVATE_V4: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    // RFC1918, loopback, link-local
    ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "127.0.0.0/8", "169.254.0.0/16"]
        .iter()
        .filter_map(|net| net.parse().ok())
        .collect()
});

static PRIVATE_V6: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    // unique local, link-local
    ["fc00::/7", "fe80::/10"]
        .iter()
        .filter_map(|net| net.parse().ok())
        .collect()
});

/// Configuration for [`HttpFetcher`].
///
/// The request bound is the navigation timeout handed to [`PageSession::goto`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub user_agent: String,
    pub allow_private_networks: bool,
    pub headers: HashMap<String, String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_private_networks: false,
            headers: HashMap::new(),
        }
    }
}

/// Fetches pages over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    opts: HttpOptions,
}

impl HttpFetcher {
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::new()
    }

    fn new(opts: HttpOptions, client: Option<reqwest::Client>) -> Self {
        let client = client.unwrap_or_else(|| {
            reqwest::Client::builder()
                .user_agent(opts.user_agent.clone())
                .cookie_store(true)
                .build()
                .unwrap_or_default()
        });
        Self { client, opts }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcherBuilder::new().build()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn open(&self) -> Result<Box<dyn PageSession>, ExtractError> {
        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            opts: self.opts.clone(),
            page: None,
        }))
    }
}

/// Builder for [`HttpFetcher`].
#[derive(Debug, Clone, Default)]
pub struct HttpFetcherBuilder {
    opts: HttpOptions,
    client: Option<reqwest::Client>,
}

impl HttpFetcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> HttpFetcher {
        HttpFetcher::new(self.opts, self.client)
    }
}

/// A fetched response body.
#[derive(Debug, Clone)]
struct FetchedPage {
    status: u16,
    content_type: Option<String>,
    body: Bytes,
}

struct HttpSession {
    client: reqwest::Client,
    opts: HttpOptions,
    page: Option<FetchedPage>,
}

#[async_trait]
impl PageSession for HttpSession {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<Navigation, ExtractError> {
        self.page = fetch(&self.client, url, &self.opts, timeout).await?;
        Ok(match &self.page {
            Some(page) => Navigation::Response {
                status: page.status,
            },
            None => Navigation::NoResponse,
        })
    }

    async fn wait_for_selector(
        &mut self,
        selectors: &[String],
        _timeout: Duration,
    ) -> Result<(), ExtractError> {
        let html = self.content().await?;
        if contains_any(&html, selectors) {
            return Ok(());
        }
        Err(ExtractError::timeout(
            "",
            "WaitForSelector",
            Some(anyhow::anyhow!("none of {:?} in fetched document", selectors)),
        ))
    }

    async fn content(&mut self) -> Result<String, ExtractError> {
        Ok(self
            .page
            .as_ref()
            .map(|page| decode_body(&page.body, page.content_type.as_deref()))
            .unwrap_or_default())
    }

    async fn close(&mut self) -> Result<(), ExtractError> {
        self.page = None;
        Ok(())
    }
}

/// Check if an IP address is in a private/reserved range.
fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => PRIVATE_V4.iter().any(|net| net.contains(ip)),
        IpAddr::V6(ip) => ip.is_loopback() || PRIVATE_V6.iter().any(|net| net.contains(ip)),
    }
}

/// Rejects URLs whose host is, or resolves to, a private address.
///
/// DNS failures are not reported here; the request itself fails afterwards.
async fn guard_private(target: &url::Url, url: &str) -> Result<(), ExtractError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    let blocked = || {
        ExtractError::ssrf(
            url,
            "Goto",
            Some(anyhow::anyhow!("private IP addresses are not allowed")),
        )
    };

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return if is_private_ip(&ip) { Err(blocked()) } else { Ok(()) };
    }

    let port = target.port_or_known_default().unwrap_or(80);
    if let Ok(addrs) = tokio::net::lookup_host((host, port)).await {
        for socket_addr in addrs {
            if is_private_ip(&socket_addr.ip()) {
                return Err(blocked());
            }
        }
    }
    Ok(())
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Fetches `url`. A transport failure yields `Ok(None)`; any status is returned with its body.
async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &HttpOptions,
    timeout: Duration,
) -> Result<Option<FetchedPage>, ExtractError> {
    let parsed_url = url::Url::parse(url).map_err(|e| {
        ExtractError::invalid_url(url, "Goto", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ExtractError::invalid_url(
            url,
            "Goto",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    if !opts.allow_private_networks {
        guard_private(&parsed_url, url).await?;
    }

    let mut request = client.get(url).timeout(timeout);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => {
            return Err(ExtractError::timeout(
                url,
                "Goto",
                Some(anyhow::anyhow!("request timed out: {}", e)),
            ))
        }
        Err(e) => {
            warn!(url, error = %e, "request failed");
            return Ok(None);
        }
    };

    // Redirects may land on a private address.
    if !opts.allow_private_networks {
        guard_private(response.url(), url).await?;
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ExtractError::fetch(
                url,
                "Goto",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| {
        ExtractError::fetch(
            url,
            "Goto",
            Some(anyhow::anyhow!("failed to read body: {}", e)),
        )
    })?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ExtractError::fetch(
            url,
            "Goto",
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    debug!(url, status, bytes = body.len(), "fetched page");
    Ok(Some(FetchedPage {
        status,
        content_type,
        body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn local_fetcher() -> HttpFetcher {
        HttpFetcher::builder()
            .allow_private_networks(true)
            .user_agent("test-agent")
            .build()
    }

    #[tokio::test]
    async fn goto_reports_status_and_serves_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/artykul");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><body><article>Zażółć</article></body></html>");
        });

        let mut session = local_fetcher().open().await.unwrap();
        let nav = session
            .goto(&server.url("/artykul"), Duration::from_secs(5))
            .await
            .unwrap();
        mock.assert();

        assert_eq!(nav, Navigation::Response { status: 200 });
        assert!(session.content().await.unwrap().contains("Zażółć"));
        session
            .wait_for_selector(&["article".to_string()], Duration::from_secs(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn http_error_keeps_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("<html><body><main>Nie znaleziono</main></body></html>");
        });

        let mut session = local_fetcher().open().await.unwrap();
        let nav = session
            .goto(&server.url("/missing"), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(nav.is_http_error());
        assert!(session.content().await.unwrap().contains("Nie znaleziono"));
    }

    #[tokio::test]
    async fn navigation_timeout_bounds_the_request() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_secs(2))
                .body("<html><body><article>późno</article></body></html>");
        });

        let mut session = local_fetcher().open().await.unwrap();
        let err = session
            .goto(&server.url("/slow"), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn missing_selector_is_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/bare");
            then.status(200).body("<html><body><p>x</p></body></html>");
        });

        let mut session = local_fetcher().open().await.unwrap();
        session
            .goto(&server.url("/bare"), Duration::from_secs(5))
            .await
            .unwrap();
        let err = session
            .wait_for_selector(&["article".to_string()], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn closed_session_has_no_content() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/a");
            then.status(200).body("<article>a</article>");
        });

        let mut session = local_fetcher().open().await.unwrap();
        session.goto(&server.url("/a"), Duration::from_secs(5)).await.unwrap();
        session.close().await.unwrap();
        assert_eq!(session.content().await.unwrap(), "");
    }

    #[tokio::test]
    async fn private_ip_is_blocked() {
        let server = MockServer::start();
        let mut session = HttpFetcher::default().open().await.unwrap();
        let url = format!("http://127.0.0.1:{}/test", server.port());
        let err = session.goto(&url, Duration::from_secs(5)).await.unwrap_err();
        assert!(err.is_ssrf());
    }

    #[tokio::test]
    async fn unsupported_scheme_is_invalid_url() {
        let mut session = HttpFetcher::default().open().await.unwrap();
        let err = session
            .goto("ftp://galicjaexpress.pl/plik", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[tokio::test]
    async fn connection_refused_is_no_response() {
        // Bind and drop a listener to get a port with nothing behind it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut session = local_fetcher().open().await.unwrap();
        let nav = session
            .goto(&format!("http://127.0.0.1:{}/", port), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(nav, Navigation::NoResponse);
        assert_eq!(session.content().await.unwrap(), "");
    }

    #[test]
    fn test_is_private_ip() {
        assert!(is_private_ip(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"172.31.255.255".parse().unwrap()));
        assert!(is_private_ip(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_ip(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"169.254.0.1".parse().unwrap()));
        assert!(is_private_ip(&"::1".parse().unwrap()));
        assert!(is_private_ip(&"fd00::1".parse().unwrap()));
        assert!(is_private_ip(&"fe80::1".parse().unwrap()));

        assert!(!is_private_ip(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_ip(&"172.32.0.1".parse().unwrap()));
        assert!(!is_private_ip(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=ISO-8859-2"),
            Some("iso-8859-2".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn test_decode_body_with_declared_charset() {
        // "łąka" in ISO-8859-2
        let body: &[u8] = &[0xb3, 0xb1, 0x6b, 0x61];
        assert_eq!(decode_body(body, Some("text/html; charset=iso-8859-2")), "łąka");
    }
}
