//! URL handling module for Site-Harvest
//!
//! This module provides link normalization, domain extraction, wildcard
//! matching, and the in-scope / out-of-domain / excluded classification that
//! decides whether a discovered link may enter the frontier.

mod domain;
mod matcher;
mod normalize;

use crate::config::Config;
use crate::ConfigError;
use ::url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::{matches_wildcard, ExclusionRules};
pub use normalize::{normalize, normalize_root, NormalizePolicy};

/// Classification of a candidate URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Same domain as the root and not excluded - eligible for the frontier
    InScope,
    /// Host differs from the root host
    OutOfDomain,
    /// Same domain, but the path matches an exclusion rule
    Excluded,
}

impl Classification {
    /// Returns true if the URL may be enqueued
    pub fn should_crawl(&self) -> bool {
        matches!(self, Self::InScope)
    }
}

/// The domain and exclusion rules that bound a crawl
#[derive(Debug, Clone)]
pub struct CrawlScope {
    root_domain: String,
    include_subdomains: bool,
    host_patterns: Vec<String>,
    exclusions: ExclusionRules,
}

impl CrawlScope {
    /// Creates a scope rooted at `root`
    ///
    /// With `include_subdomains`, `docs.example.com` is in scope for a root on
    /// `example.com`.
    pub fn new(root: &Url, include_subdomains: bool, exclusions: ExclusionRules) -> Self {
        let root_domain = extract_domain(root).unwrap_or_default();

        Self {
            host_patterns: vec![host_pattern(&root_domain, include_subdomains)],
            root_domain,
            include_subdomains,
            exclusions,
        }
    }

    /// Adds the host of `url` to the scope
    ///
    /// Called when the root redirects to another host (`example.com` to
    /// `www.example.com`), so that the site's own links stay in scope.
    /// Returns false if the host was already in scope.
    pub fn admit_host(&mut self, url: &Url) -> bool {
        let Some(domain) = extract_domain(url) else {
            return false;
        };
        if self.host_matches(&domain) {
            return false;
        }
        self.host_patterns
            .push(host_pattern(&domain, self.include_subdomains));
        true
    }

    fn host_matches(&self, domain: &str) -> bool {
        self.host_patterns
            .iter()
            .any(|pattern| matches_wildcard(pattern, domain))
    }

    /// Builds the scope described by a configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let policy = NormalizePolicy::from(&config.normalize);
        let root = normalize_root(&config.crawler.root_url, &policy)?;
        Ok(Self::new(
            &root,
            config.crawler.include_subdomains,
            ExclusionRules::new(config.exclude.iter().cloned()),
        ))
    }

    /// The lowercase host every in-scope URL shares
    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Classifies a normalized URL
    ///
    /// The domain check runs first, so an off-domain URL is reported as
    /// `OutOfDomain` even when its path also matches an exclusion rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_harvest::url::{Classification, CrawlScope, ExclusionRules};
    /// use url::Url;
    ///
    /// let root = Url::parse("https://example.com").unwrap();
    /// let scope = CrawlScope::new(&root, false, ExclusionRules::new(["blog"]));
    ///
    /// let classify = |s: &str| scope.classify(&Url::parse(s).unwrap());
    /// assert_eq!(classify("https://example.com/a"), Classification::InScope);
    /// assert_eq!(classify("https://other.com/b"), Classification::OutOfDomain);
    /// assert_eq!(classify("https://example.com/blog/c"), Classification::Excluded);
    /// ```
    pub fn classify(&self, url: &Url) -> Classification {
        let in_domain = extract_domain(url)
            .map(|domain| self.host_matches(&domain))
            .unwrap_or(false);

        if !in_domain {
            return Classification::OutOfDomain;
        }

        if self.exclusions.is_excluded(url) {
            return Classification::Excluded;
        }

        Classification::InScope
    }
}

fn host_pattern(domain: &str, include_subdomains: bool) -> String {
    if include_subdomains {
        format!("*.{}", domain)
    } else {
        domain.to_string()
    }
}
