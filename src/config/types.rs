use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Site-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Path substrings that exclude a URL from the crawl
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// The URL the crawl starts from; it also defines the crawl domain
    #[serde(rename = "root-url", default)]
    pub root_url: String,

    /// Maximum number of pages saved in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Number of workers fetching pages at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Optional deadline for the whole run (seconds)
    #[serde(rename = "run-timeout-secs", default)]
    pub run_timeout_secs: Option<u64>,

    /// Extra attempts for timeouts, network errors and 5xx responses
    #[serde(default)]
    pub retries: u32,

    /// Treat subdomains of the root host as in scope
    #[serde(rename = "include-subdomains", default)]
    pub include_subdomains: bool,

    /// Reject responses whose Content-Type is not HTML
    #[serde(rename = "html-only", default = "default_true")]
    pub html_only: bool,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// URL deduplication policy
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    /// `/a/` and `/a` are the same page
    #[serde(rename = "trim-trailing-slash", default = "default_true")]
    pub trim_trailing_slash: bool,

    /// Drop the query string entirely
    #[serde(rename = "strip-query", default)]
    pub strip_query: bool,

    /// Remove utm_* and click-id parameters
    #[serde(rename = "drop-tracking-params", default = "default_true")]
    pub drop_tracking_params: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the extracted text files are written to
    #[serde(default)]
    pub directory: Option<String>,

    /// Pages whose extracted text is not longer than this are not saved
    #[serde(rename = "min-text-length", default = "default_min_text_length")]
    pub min_text_length: usize,
}

fn default_max_pages() -> usize {
    50
}

fn default_concurrency() -> usize {
    4
}

fn default_request_timeout() -> u64 {
    10
}

fn default_min_text_length() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("site-harvest/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: String::new(),
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout(),
            run_timeout_secs: None,
            retries: 0,
            include_subdomains: false,
            html_only: true,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            trim_trailing_slash: true,
            strip_query: false,
            drop_tracking_params: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            min_text_length: default_min_text_length(),
        }
    }
}

impl CrawlerConfig {
    /// Per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Creates a configuration with default settings for the given root URL
    pub fn for_root(root_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.crawler.root_url = root_url.into();
        config
    }

    /// Per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        self.crawler.request_timeout()
    }

    /// Whole-run deadline, if one is configured
    pub fn run_timeout(&self) -> Option<Duration> {
        self.crawler.run_timeout_secs.map(Duration::from_secs)
    }

    /// Resolves the output directory
    ///
    /// Without an explicit directory the root host is used with dots replaced
    /// by underscores (`https://example.com` → `example_com`).
    pub fn output_directory(&self) -> PathBuf {
        if let Some(dir) = &self.output.directory {
            return PathBuf::from(dir);
        }

        let host = ::url::Url::parse(&self.crawler.root_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_else(|| "site".to_string());

        PathBuf::from(host.replace('.', "_"))
    }
}
