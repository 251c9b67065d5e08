//! URL to filename mapping
//!
//! Every saved page gets a filename derived from its URL path. Names are safe
//! on Windows, macOS and Linux, and unique within a run.

use percent_encoding::percent_decode_str;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Extension appended to every generated name
pub const EXTENSION: &str = "md";

/// Maximum stem length in bytes, before any collision suffix
pub const MAX_STEM_BYTES: usize = 100;

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Default)]
struct Assignments {
    /// Normalized URL -> assigned filename
    by_url: HashMap<String, String>,
    /// Lowercased names already taken
    taken: HashSet<String>,
}

/// Generates unique filenames for crawled URLs
///
/// The same URL always maps to the same name. Different URLs that sanitize
/// to the same stem receive `_1`, `_2`, ... suffixes in the order they are
/// first seen. Collisions are compared case-insensitively so that names stay
/// distinct on case-insensitive filesystems.
#[derive(Debug, Default)]
pub struct FilenameGenerator {
    inner: Mutex<Assignments>,
}

impl FilenameGenerator {
    /// Creates a generator with no names taken
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator that treats `names` as already taken
    ///
    /// Used to avoid overwriting files left in the output directory by an
    /// earlier run.
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let taken = names
            .into_iter()
            .map(|name| name.as_ref().to_lowercase())
            .collect();

        Self {
            inner: Mutex::new(Assignments {
                by_url: HashMap::new(),
                taken,
            }),
        }
    }

    /// Returns the filename for `url`, assigning one on first use
    ///
    /// # Examples
    ///
    /// ```
    /// use site_harvest::storage::FilenameGenerator;
    /// use url::Url;
    ///
    /// let names = FilenameGenerator::new();
    /// let page = Url::parse("https://example.com/docs/intro").unwrap();
    /// assert_eq!(names.filename_for(&page), "docs_intro.md");
    ///
    /// let root = Url::parse("https://example.com/").unwrap();
    /// assert_eq!(names.filename_for(&root), "index.md");
    /// ```
    pub fn filename_for(&self, url: &Url) -> String {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = inner.by_url.get(url.as_str()) {
            return existing.clone();
        }

        let stem = stem_for(url);
        let mut candidate = format!("{}.{}", stem, EXTENSION);
        let mut counter = 1;
        while inner.taken.contains(&candidate.to_lowercase()) {
            candidate = format!("{}_{}.{}", stem, counter, EXTENSION);
            counter += 1;
        }

        inner.taken.insert(candidate.to_lowercase());
        inner
            .by_url
            .insert(url.as_str().to_string(), candidate.clone());
        candidate
    }

    /// Number of names assigned in this run
    pub fn assigned(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_url
            .len()
    }
}

/// Derives the sanitized stem (no extension, no collision suffix) for a URL
pub fn stem_for(url: &Url) -> String {
    // Invalid UTF-8 sequences become U+FFFD instead of discarding the whole path
    let decoded = percent_decode_str(url.path()).decode_utf8_lossy();
    let path = decoded.trim_matches('/');

    let joined = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    sanitize_stem(&joined)
}

/// Makes an arbitrary string safe to use as a filename stem
pub fn sanitize_stem(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let mut stem = truncate_on_char_boundary(&replaced, MAX_STEM_BYTES)
        .trim_end_matches(['.', ' '])
        .trim_start()
        .to_string();

    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        stem = "index".to_string();
    }

    // Windows treats "CON.txt" like "CON", so compare the part before any dot
    let base = stem.split('.').next().unwrap_or_default();
    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(base))
    {
        stem.insert(0, '_');
    }

    stem
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
