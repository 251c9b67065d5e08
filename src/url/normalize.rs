use crate::config::NormalizeConfig;
use crate::ConfigError;
use url::Url;

/// Query parameters that only carry tracking data
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Controls which URL variants are considered the same page
///
/// The defaults treat `/docs/` and `/docs` as one page, keep query strings
/// significant, and drop tracking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizePolicy {
    /// Remove a trailing slash from any path other than `/`
    pub trim_trailing_slash: bool,

    /// Remove the query string entirely
    pub strip_query: bool,

    /// Remove `utm_*`, `fbclid`, `gclid` and `mc_eid` parameters
    pub drop_tracking_params: bool,
}

impl Default for NormalizePolicy {
    fn default() -> Self {
        Self {
            trim_trailing_slash: true,
            strip_query: false,
            drop_tracking_params: true,
        }
    }
}

impl From<&NormalizeConfig> for NormalizePolicy {
    fn from(config: &NormalizeConfig) -> Self {
        Self {
            trim_trailing_slash: config.trim_trailing_slash,
            strip_query: config.strip_query,
            drop_tracking_params: config.drop_tracking_params,
        }
    }
}

/// Resolves a candidate link against a base URL and normalizes it
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; empty candidates are dropped
/// 2. Resolve against `base` (relative paths, `..`, protocol-relative `//host`)
/// 3. Reject anything that is not HTTP(S) or has no host
/// 4. Remove the fragment
/// 5. Apply the [`NormalizePolicy`] (query handling, trailing slash)
///
/// Scheme and host lowercasing and default-port removal come from the URL
/// parser itself.
///
/// # Returns
///
/// * `Some(Url)` - The normalized absolute URL
/// * `None` - The candidate is malformed or not a web link (`mailto:`,
///   `javascript:`, `tel:`, `data:` ...)
///
/// # Examples
///
/// ```
/// use site_harvest::url::{normalize, NormalizePolicy};
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// let policy = NormalizePolicy::default();
///
/// let url = normalize(&base, "../guide/#setup", &policy).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/guide");
///
/// assert!(normalize(&base, "mailto:team@example.com", &policy).is_none());
/// ```
pub fn normalize(base: &Url, candidate: &str, policy: &NormalizePolicy) -> Option<Url> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let mut url = base.join(candidate).ok()?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    if url.host_str().map_or(true, str::is_empty) {
        return None;
    }

    url.set_fragment(None);
    apply_policy(&mut url, policy);

    Some(url)
}

/// Parses and normalizes the configured root URL
///
/// Unlike [`normalize`], a bad root is a configuration error rather than a
/// silently dropped link.
pub fn normalize_root(root: &str, policy: &NormalizePolicy) -> Result<Url, ConfigError> {
    let mut url = Url::parse(root.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", root, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}': only HTTP and HTTPS are supported, got {}",
            root,
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!("'{}': missing host", root)));
    }

    url.set_fragment(None);
    apply_policy(&mut url, policy);

    Ok(url)
}

fn apply_policy(url: &mut Url, policy: &NormalizePolicy) {
    if policy.strip_query {
        url.set_query(None);
    } else if policy.drop_tracking_params {
        drop_tracking_params(url);
    }

    if url.query() == Some("") {
        url.set_query(None);
    }

    if policy.trim_trailing_slash {
        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let trimmed = path.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
            url.set_path(&trimmed);
        }
    }
}

/// Rewrites the query without tracking parameters
///
/// The query is only rebuilt when a tracking parameter is present, so other
/// URLs keep their exact original encoding.
fn drop_tracking_params(url: &mut Url) {
    if !url.query_pairs().any(|(key, _)| is_tracking_param(&key)) {
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
