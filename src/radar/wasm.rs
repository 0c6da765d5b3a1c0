//! KeywordRadar: JS-Facing Facade over the Keyword Scanner
//!
//! Owns the current automaton and rebuilds it from the title list supplied by
//! the host. One `scanBlock` call returns the flat matches, their groups and
//! timings for a note block.
//!
//! # Usage (JavaScript)
//! ```javascript,ignore
//! const radar = new KeywordRadar({ whole_word_only: false, ignore_keywords: ['TODO'] });
//! radar.rebuildIfChanged(titles);
//! const { matches, groups, stats } = radar.scanBlock(block.string);
//! const linked = radar.linkAll(block.string);
//! ```

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use super::automaton::KeywordAutomaton;
use super::config::RadarConfig;
use super::console::{console_error, console_log};
use super::dictionary::{KeywordDictionary, RevisionWatch};
use super::error::RadarError;
use super::grouper::{group, KeywordGroup};
use super::linker::{link_all, link_match, segments, Segment};
use super::scanner::Match;
use super::zones::{exclusion_zones, Zone};

// ==================== TYPE DEFINITIONS ====================

/// Timing and size statistics for one block scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub text_length: usize,
    pub keyword_count: usize,
    pub match_count: usize,
    pub group_count: usize,
    pub scan_us: u64,
    pub group_us: u64,
    pub total_us: u64,
}

/// Result of scanning one note block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockScan {
    pub matches: Vec<Match>,
    pub groups: Vec<KeywordGroup>,
    pub stats: ScanStats,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, RadarError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| RadarError::Serialization(e.to_string()))
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue, what: &str) -> Result<T, RadarError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| RadarError::InvalidInput(format!("{}: {}", what, e)))
}

// ==================== MAIN IMPLEMENTATION ====================

/// Keyword radar for note blocks
#[wasm_bindgen]
pub struct KeywordRadar {
    config: RadarConfig,
    automaton: KeywordAutomaton,
    watch: RevisionWatch,
}

impl Default for KeywordRadar {
    fn default() -> Self {
        Self::new(RadarConfig::default())
    }
}

#[wasm_bindgen]
impl KeywordRadar {
    /// Create a radar from an optional settings object
    #[wasm_bindgen(constructor)]
    pub fn js_new(config: JsValue) -> Result<KeywordRadar, JsValue> {
        let config: RadarConfig = if config.is_null() || config.is_undefined() {
            RadarConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| RadarError::InvalidConfig(e.to_string()))?
        };
        Ok(Self::new(config))
    }

    /// Rebuild from an array of page titles; returns the indexed keyword count
    #[wasm_bindgen(js_name = rebuild)]
    pub fn js_rebuild(&mut self, titles: JsValue) -> Result<usize, JsValue> {
        let titles: Vec<String> = from_js(titles, "titles")?;
        Ok(self.rebuild(&titles))
    }

    /// Rebuild only if the title list changed since the last call
    #[wasm_bindgen(js_name = rebuildIfChanged)]
    pub fn js_rebuild_if_changed(&mut self, titles: JsValue) -> Result<bool, JsValue> {
        let titles: Vec<String> = from_js(titles, "titles")?;
        Ok(self.rebuild_if_changed(&titles))
    }

    /// Replace the ignore list from the raw settings string.
    ///
    /// Takes effect at the next rebuild.
    #[wasm_bindgen(js_name = setIgnoreKeywords)]
    pub fn js_set_ignore_keywords(&mut self, setting: &str) {
        self.set_ignore_keywords(setting);
    }

    #[wasm_bindgen(js_name = search)]
    pub fn js_search(&self, text: &str) -> JsValue {
        match to_js(&self.search(text)) {
            Ok(v) => v,
            Err(e) => {
                console_error!("[KeywordRadar] {}", e);
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = scanBlock)]
    pub fn js_scan_block(&self, text: &str) -> JsValue {
        match to_js(&self.scan_block(text)) {
            Ok(v) => v,
            Err(e) => {
                console_error!("[KeywordRadar] {}", e);
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = linkAll)]
    pub fn js_link_all(&self, text: &str) -> String {
        self.link_all(text)
    }

    #[wasm_bindgen(js_name = linkMatch)]
    pub fn js_link_match(&self, text: &str, m: JsValue) -> Result<String, JsValue> {
        let m: Match = from_js(m, "match")?;
        Ok(link_match(text, &m))
    }

    /// Plain runs and keyword groups of `text`, for inline rendering
    #[wasm_bindgen(js_name = segments)]
    pub fn js_segments(&self, text: &str) -> JsValue {
        match to_js(&self.segments(text)) {
            Ok(v) => v,
            Err(e) => {
                console_error!("[KeywordRadar] {}", e);
                JsValue::NULL
            }
        }
    }

    /// Spans of `text` that are never scanned under the current settings
    #[wasm_bindgen(js_name = exclusionZones)]
    pub fn js_exclusion_zones(&self, text: &str) -> JsValue {
        match to_js(&self.exclusion_zones(text)) {
            Ok(v) => v,
            Err(e) => {
                console_error!("[KeywordRadar] {}", e);
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = keywordCount)]
    pub fn keyword_count(&self) -> usize {
        self.automaton.keyword_count()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.automaton.node_count()
    }
}

impl KeywordRadar {
    pub fn new(config: RadarConfig) -> Self {
        let automaton = KeywordAutomaton::build(std::iter::empty::<&str>(), config.scan.case_sensitive);
        Self {
            config,
            automaton,
            watch: RevisionWatch::new(),
        }
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn automaton(&self) -> &KeywordAutomaton {
        &self.automaton
    }

    pub fn watch(&self) -> &RevisionWatch {
        &self.watch
    }

    /// Filter `titles` and build a fresh automaton from them
    pub fn rebuild<S: AsRef<str>>(&mut self, titles: &[S]) -> usize {
        self.watch.observe(titles);
        self.build_from(titles)
    }

    /// Rebuild unless `titles` matches the watermark of the previous call
    pub fn rebuild_if_changed<S: AsRef<str>>(&mut self, titles: &[S]) -> bool {
        if !self.watch.observe(titles) {
            return false;
        }
        self.build_from(titles);
        true
    }

    fn build_from<S: AsRef<str>>(&mut self, titles: &[S]) -> usize {
        let started = instant::Instant::now();
        let dictionary = KeywordDictionary::from_titles(titles, &self.config);
        self.automaton = KeywordAutomaton::build(dictionary.keywords(), self.config.scan.case_sensitive);

        console_log!(
            "[KeywordRadar] Rebuilt: {} of {} titles, {} nodes ({}us)",
            self.automaton.keyword_count(),
            titles.len(),
            self.automaton.node_count(),
            started.elapsed().as_micros()
        );
        self.automaton.keyword_count()
    }

    /// Replace the ignore list; forces the next `rebuild_if_changed` to rebuild
    pub fn set_ignore_keywords(&mut self, setting: &str) {
        self.config = std::mem::take(&mut self.config).with_ignore_setting(setting);
        self.watch.invalidate();
    }

    /// All keyword occurrences in `text` under the configured policy
    pub fn search(&self, text: &str) -> Vec<Match> {
        self.automaton.scan(text, &self.config.scan)
    }

    /// Matches, groups and timings for one block
    pub fn scan_block(&self, text: &str) -> BlockScan {
        let started = instant::Instant::now();

        let matches = self.search(text);
        let scan_us = started.elapsed().as_micros() as u64;

        let group_started = instant::Instant::now();
        let groups = group(&matches, text);
        let group_us = group_started.elapsed().as_micros() as u64;

        let stats = ScanStats {
            text_length: text.chars().count(),
            keyword_count: self.automaton.keyword_count(),
            match_count: matches.len(),
            group_count: groups.len(),
            scan_us,
            group_us,
            total_us: started.elapsed().as_micros() as u64,
        };

        BlockScan { matches, groups, stats }
    }

    /// Link every group in `text` to its longest keyword
    pub fn link_all(&self, text: &str) -> String {
        let groups = group(&self.search(text), text);
        link_all(text, &groups)
    }

    /// Inline layout of `text`; `Segment::Keyword::group` indexes the groups
    /// that `scan_block` returns for the same text
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let groups = group(&self.search(text), text);
        segments(text, &groups)
    }

    pub fn exclusion_zones(&self, text: &str) -> Vec<Zone> {
        exclusion_zones(text, &self.config.scan)
    }
}

/// Group a JS array of matches against their source text
#[wasm_bindgen(js_name = groupMatches)]
pub fn js_group_matches(matches: JsValue, text: &str) -> Result<JsValue, JsValue> {
    let matches: Vec<Match> = from_js(matches, "matches")?;
    Ok(to_js(&group(&matches, text))?)
}
