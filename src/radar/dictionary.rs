//! Dictionary: Title Filtering and Rebuild Watermarks
//!
//! The title source hands over every page title on each refresh. Titles that
//! are too short or on the ignore list are dropped before indexing, and a
//! content watermark lets the caller skip rebuilding the automaton when the
//! list has not changed.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::config::RadarConfig;

// =============================================================================
// KeywordDictionary
// =============================================================================

/// Filtered, deduplicated keyword list ready for the automaton builder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordDictionary {
    keywords: Vec<String>,
}

impl KeywordDictionary {
    /// Apply the host filters to the raw title list, keeping input order
    pub fn from_titles<I, S>(titles: I, config: &RadarConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ignored: HashSet<&str> = config.ignore_keywords.iter().map(String::as_str).collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut keywords = Vec::new();

        for title in titles {
            let title = title.as_ref();
            if title.chars().count() < config.min_keyword_len || ignored.contains(title) {
                continue;
            }
            if seen.insert(title.to_string()) {
                keywords.push(title.to_string());
            }
        }

        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

// =============================================================================
// RevisionWatch
// =============================================================================

/// Content watermark for the keyword list
#[derive(Debug, Clone, Default)]
pub struct RevisionWatch {
    last: Option<u64>,
    check_count: u64,
    skip_count: u64,
}

impl RevisionWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the watermark of `keywords`; true if it differs from the last one
    pub fn observe<S: AsRef<str>>(&mut self, keywords: &[S]) -> bool {
        self.observe_revision(Self::compute_hash(keywords))
    }

    /// Record an explicit revision number; true if it differs from the last one
    pub fn observe_revision(&mut self, revision: u64) -> bool {
        self.check_count += 1;
        let changed = self.last != Some(revision);
        if !changed {
            self.skip_count += 1;
        }
        self.last = Some(revision);
        changed
    }

    /// Forget the last watermark so the next observation counts as a change
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    /// Order-sensitive hash of a keyword list
    pub fn compute_hash<S: AsRef<str>>(keywords: &[S]) -> u64 {
        let mut hasher = DefaultHasher::new();
        keywords.len().hash(&mut hasher);
        for keyword in keywords {
            keyword.as_ref().hash(&mut hasher);
        }
        hasher.finish()
    }
}
