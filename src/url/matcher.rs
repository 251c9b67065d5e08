use url::Url;

/// Checks if a domain matches a wildcard pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches:
///    - "example.com" (the bare domain)
///    - "blog.example.com" (single subdomain)
///    - "api.v2.example.com" (nested subdomains)
///
/// # Examples
///
/// ```
/// use site_harvest::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(!matches_wildcard("example.com", "blog.example.com"));
///
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "myexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Path substrings that keep URLs out of the crawl
///
/// A URL is excluded when its path contains any rule. Rules are matched
/// case-sensitively, the same way paths are served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    rules: Vec<String>,
}

impl ExclusionRules {
    /// Builds the rule set, ignoring empty entries
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(Into::into)
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Returns the first rule matching the URL's path, if any
    pub fn matching_rule(&self, url: &Url) -> Option<&str> {
        let path = url.path();
        self.rules
            .iter()
            .find(|rule| path.contains(rule.as_str()))
            .map(String::as_str)
    }

    /// Returns true if any rule matches the URL's path
    pub fn is_excluded(&self, url: &Url) -> bool {
        self.matching_rule(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
