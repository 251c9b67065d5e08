//! Site-Harvest main entry point
//!
//! This is the command-line interface for the Site-Harvest text harvester.

use anyhow::{Context, Result};
use clap::Parser;
use site_harvest::config::{parse_config, Config};
use site_harvest::output::print_report;
use site_harvest::Crawler;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Harvest: save a website's text as Markdown files
///
/// Site-Harvest starts at a root URL, follows links that stay on the same
/// domain, and writes the readable text of each page to its own `.md` file.
#[derive(Parser, Debug)]
#[command(name = "site-harvest")]
#[command(version)]
#[command(about = "Save a website's text as Markdown files", long_about = None)]
struct Cli {
    /// Root URL to start crawling from (may also come from --config)
    #[arg(value_name = "ROOT_URL")]
    root: Option<String>,

    /// Maximum number of pages to save
    #[arg(short, long)]
    max_pages: Option<usize>,

    /// Output directory (default: root host with dots replaced by underscores)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Skip URLs whose path contains this text (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Number of pages fetched at the same time
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Stop the whole crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    run_timeout: Option<u64>,

    /// Retry timeouts, network errors and 5xx responses this many times
    #[arg(long)]
    retries: Option<u32>,

    /// Also crawl subdomains of the root host
    #[arg(long)]
    subdomains: bool,

    /// Treat URLs that differ only by query string as the same page
    #[arg(long)]
    strip_query: bool,

    /// Treat `/a` and `/a/` as different pages
    #[arg(long)]
    keep_trailing_slash: bool,

    /// Path to TOML configuration file (command-line flags take precedence)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let crawler = Crawler::new(config).context("Failed to start crawl")?;

    // Ctrl-C stops dequeuing; in-flight pages finish and the report is still printed
    let cancel = crawler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let report = crawler.run().await.context("Crawl failed")?;

    if !cli.quiet {
        print_report(&report);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_harvest=info,warn"),
            1 => EnvFilter::new("site_harvest=debug,info"),
            2 => EnvFilter::new("site_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            parse_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(root) = &cli.root {
        config.crawler.root_url = root.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(output) = &cli.output {
        config.output.directory = Some(output.display().to_string());
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.iter().cloned());
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(run_timeout) = cli.run_timeout {
        config.crawler.run_timeout_secs = Some(run_timeout);
    }
    if let Some(retries) = cli.retries {
        config.crawler.retries = retries;
    }
    if cli.subdomains {
        config.crawler.include_subdomains = true;
    }
    if cli.strip_query {
        config.normalize.strip_query = true;
    }
    if cli.keep_trailing_slash {
        config.normalize.trim_trailing_slash = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_harvest::config::validate;

    #[test]
    fn test_cli_parses_all_flags() {
        let cli = Cli::parse_from([
            "site-harvest",
            "https://example.com",
            "-m",
            "5",
            "-o",
            "out",
            "-x",
            "blog",
            "-x",
            "/tag/",
            "-c",
            "2",
            "-t",
            "3",
            "--run-timeout",
            "60",
            "--retries",
            "1",
            "--subdomains",
            "--strip-query",
            "--keep-trailing-slash",
        ]);

        let mut config = Config::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.crawler.root_url, "https://example.com");
        assert_eq!(config.crawler.max_pages, 5);
        assert_eq!(config.output.directory.as_deref(), Some("out"));
        assert_eq!(config.exclude, vec!["blog", "/tag/"]);
        assert_eq!(config.crawler.concurrency, 2);
        assert_eq!(config.crawler.request_timeout_secs, 3);
        assert_eq!(config.crawler.run_timeout_secs, Some(60));
        assert_eq!(config.crawler.retries, 1);
        assert!(config.crawler.include_subdomains);
        assert!(config.normalize.strip_query);
        assert!(!config.normalize.trim_trailing_slash);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults_untouched_without_flags() {
        let cli = Cli::parse_from(["site-harvest", "https://example.com"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.crawler.max_pages, 50);
        assert!(config.normalize.trim_trailing_slash);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["site-harvest", "https://example.com", "-q", "-v"]);
        assert!(result.is_err());
    }
}
