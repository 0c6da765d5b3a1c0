//! Configuration types and defaults for the keyword radar
//!
//! `ScanConfig` carries the policy switches of the scanning algorithm,
//! `RadarConfig` wraps it with the host-level settings applied to the
//! title list before the automaton is built.

use serde::{Deserialize, Serialize};

use super::error::RadarError;

fn default_true() -> bool { true }

fn default_min_keyword_len() -> usize { 3 }

// =============================================================================
// Scan Configuration
// =============================================================================

/// Policy switches for one scanning algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Index and match keywords with their exact case. Fixed at build time. Default: true
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    /// Only report matches flanked by non-Latin-letter characters. Default: true
    #[serde(default = "default_true")]
    pub whole_word_only: bool,
    /// Treat bare URLs and domain-like tokens as exclusion zones. Default: true
    #[serde(default = "default_true")]
    pub recognize_urls: bool,
    /// Skip a markup-free `key::` prefix at the start of the text. Default: true
    #[serde(default = "default_true")]
    pub recognize_colon_prefix: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word_only: true,
            recognize_urls: true,
            recognize_colon_prefix: true,
        }
    }
}

impl ScanConfig {
    /// Configuration used by the inline radar: overlapping and partial-word
    /// matches are reported so the grouper can merge them.
    pub fn radar() -> Self {
        Self {
            whole_word_only: false,
            ..Self::default()
        }
    }

    /// Case-insensitive variant of the default configuration
    pub fn case_insensitive() -> Self {
        Self {
            case_sensitive: false,
            ..Self::default()
        }
    }
}

// =============================================================================
// Radar Configuration
// =============================================================================

/// Host settings for the keyword radar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarConfig {
    #[serde(flatten)]
    pub scan: ScanConfig,
    /// Titles shorter than this many characters are never indexed. Default: 3
    #[serde(default = "default_min_keyword_len")]
    pub min_keyword_len: usize,
    /// Titles excluded from the dictionary
    #[serde(default)]
    pub ignore_keywords: Vec<String>,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            min_keyword_len: default_min_keyword_len(),
            ignore_keywords: Vec::new(),
        }
    }
}

impl RadarConfig {
    /// Parse a JSON settings object. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, RadarError> {
        serde_json::from_str(json).map_err(|e| RadarError::InvalidConfig(e.to_string()))
    }

    /// Replace the ignore list from the raw settings string
    pub fn with_ignore_setting(mut self, setting: &str) -> Self {
        self.ignore_keywords = parse_ignore_list(setting);
        self
    }
}

/// Parse the "ignore keywords" setting.
///
/// Entries are comma-separated and may be written bare or as page
/// references: `[[keywords1]],[[keywords2]], other`.
pub fn parse_ignore_list(setting: &str) -> Vec<String> {
    setting
        .split(',')
        .map(|entry| {
            let entry = entry.trim();
            let entry = entry.strip_prefix("[[").unwrap_or(entry);
            let entry = entry.strip_suffix("]]").unwrap_or(entry);
            entry.trim().to_string()
        })
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();
        assert!(config.case_sensitive);
        assert!(config.whole_word_only);
        assert!(config.recognize_urls);
        assert!(config.recognize_colon_prefix);
        assert!(!ScanConfig::radar().whole_word_only);
        assert!(!ScanConfig::case_insensitive().case_sensitive);
    }

    #[test]
    fn test_from_json_partial() {
        let config = RadarConfig::from_json(r#"{ "whole_word_only": false, "min_keyword_len": 2 }"#)
            .unwrap();
        assert!(!config.scan.whole_word_only);
        assert!(config.scan.case_sensitive);
        assert_eq!(config.min_keyword_len, 2);
        assert!(config.ignore_keywords.is_empty());
    }

    #[test]
    fn test_from_json_empty_object_is_default() {
        assert_eq!(RadarConfig::from_json("{}").unwrap(), RadarConfig::default());
    }

    #[test]
    fn test_from_json_invalid() {
        let err = RadarConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RadarError::InvalidConfig(_)));
    }

    #[test]
    fn test_parse_ignore_list() {
        let parsed = parse_ignore_list("[[TODO]],[[DONE]], inbox ,, [[ ]]");
        assert_eq!(parsed, vec!["TODO", "DONE", "inbox"]);
    }

    #[test]
    fn test_parse_ignore_list_empty() {
        assert!(parse_ignore_list("").is_empty());
        assert!(parse_ignore_list("  ,  ").is_empty());
    }

    #[test]
    fn test_with_ignore_setting() {
        let config = RadarConfig::default().with_ignore_setting("[[Daily Notes]]");
        assert_eq!(config.ignore_keywords, vec!["Daily Notes"]);
    }
}
