// ABOUTME: CLI binary for the kronika article extractor.
// ABOUTME: Extracts articles from URLs or saved HTML files and prints the records.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use kronika::{
    ArticleRecord, ExtractionPipeline, FetchFailurePolicy, HttpFetcher, PipelineBuilder,
    StaticFetcher, UnknownDomainPolicy,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kronika")]
#[command(about = "Extract normalized articles from publisher pages")]
struct Args {
    /// Output format: json (default), text/txt, html
    #[arg(short = 'f', long = "format", default_value = "json")]
    format: String,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// HTML file to extract from (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL the HTML file was saved from (required with --html)
    #[arg(long = "url")]
    url: Option<String>,

    /// Stop on HTTP errors, missing responses and readiness timeouts
    #[arg(long = "abort-on-fetch-error")]
    abort_on_fetch_error: bool,

    /// Fail for hosts without a dedicated scraper instead of using generic extraction
    #[arg(long = "reject-unknown-domains")]
    reject_unknown_domains: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Scroll passes to trigger lazy-loaded content (browser fetcher only)
    #[arg(long = "lazy-load", default_value_t = 0)]
    lazy_load: u32,

    /// Render pages in a browser through this WebDriver endpoint
    #[cfg(feature = "webdriver")]
    #[arg(long = "webdriver")]
    webdriver: Option<String>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// URLs to extract (fetch mode)
    #[arg()]
    urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
    Html,
}

fn parse_format(format: &str) -> OutputFormat {
    match format.to_lowercase().as_str() {
        "text" | "txt" => OutputFormat::Text,
        "html" => OutputFormat::Html,
        _ => OutputFormat::Json,
    }
}

fn format_output(records: &[ArticleRecord], format: OutputFormat) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Json if records.len() == 1 => serde_json::to_string_pretty(&records[0])?,
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
        OutputFormat::Text => records
            .iter()
            .map(|r| r.content_text().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Html => records
            .iter()
            .map(|r| r.content_html().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n\n"),
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn base_builder(args: &Args) -> PipelineBuilder {
    let mut builder = ExtractionPipeline::builder().lazy_load_passes(args.lazy_load);
    if args.abort_on_fetch_error {
        builder = builder.fetch_failure(FetchFailurePolicy::Abort);
    }
    if args.reject_unknown_domains {
        builder = builder.unknown_domain(UnknownDomainPolicy::Reject);
    }
    builder
}

fn online_builder(args: &Args) -> PipelineBuilder {
    let builder = base_builder(args);

    #[cfg(feature = "webdriver")]
    if let Some(endpoint) = &args.webdriver {
        return builder.fetcher(kronika::WebDriverFetcher::new(endpoint.clone()));
    }

    builder.fetcher(
        HttpFetcher::builder()
            .allow_private_networks(args.allow_private_networks)
            .build(),
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    if args.html.is_some() && args.url.is_none() {
        eprintln!("error: --url is required when using --html");
        return ExitCode::from(1);
    }

    if args.html.is_none() && args.urls.is_empty() {
        eprintln!("error: at least one URL is required, or use --html with --url");
        return ExitCode::from(1);
    }

    if args.html.is_some() && !args.urls.is_empty() {
        eprintln!("error: cannot use both --html and positional URLs");
        return ExitCode::from(1);
    }

    let start = Instant::now();
    let mut records: Vec<ArticleRecord> = Vec::new();
    let mut had_error = false;

    let (pipeline, urls) = match (&args.html, &args.url) {
        (Some(html_path), Some(url)) => match fs::read_to_string(html_path) {
            Ok(html) => (
                base_builder(&args).fetcher(StaticFetcher::new(html)).build(),
                vec![url.clone()],
            ),
            Err(e) => {
                eprintln!("error reading file {:?}: {}", html_path, e);
                return ExitCode::from(1);
            }
        },
        _ => (online_builder(&args).build(), args.urls.clone()),
    };

    for url in &urls {
        match pipeline.try_extract(url).await {
            Ok(record) => records.push(record),
            Err(e) => {
                eprintln!("error extracting {}: {}", url, e);
                had_error = true;
            }
        }
    }

    let elapsed = start.elapsed();

    if !records.is_empty() {
        match format_output(&records, parse_format(&args.format)) {
            Ok(output_str) => {
                if let Some(output_path) = &args.output {
                    if let Err(e) = fs::write(output_path, &output_str) {
                        eprintln!("error writing to {:?}: {}", output_path, e);
                        had_error = true;
                    }
                } else {
                    println!("{}", output_str);
                }
            }
            Err(e) => {
                eprintln!("error serializing records: {}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
