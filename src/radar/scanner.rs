//! Scanner: Single-Pass Keyword Matching over Annotated Text
//!
//! Walks the text once, left to right. Exclusion zones are skipped and reset
//! the automaton to root; every other character drives one Aho-Corasick
//! transition, and each keyword recognized at the new state is emitted,
//! subject to the whole-word rule.

use serde::{Deserialize, Serialize};

use super::automaton::{KeywordAutomaton, NodeId};
use super::config::ScanConfig;
use super::zones::{ScanText, Step, ZoneCursor};

// =============================================================================
// Types
// =============================================================================

/// One keyword occurrence, in character positions (`end_index` inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    /// The keyword as supplied to the dictionary (original case)
    pub keyword: String,
    pub start_index: usize,
    pub end_index: usize,
}

impl Match {
    pub fn new(keyword: impl Into<String>, start_index: usize, end_index: usize) -> Self {
        Self {
            keyword: keyword.into(),
            start_index,
            end_index,
        }
    }

    /// Length of the matched span in characters
    pub fn char_len(&self) -> usize {
        self.end_index.saturating_add(1).saturating_sub(self.start_index)
    }

    /// Closed-interval overlap
    pub fn overlaps(&self, other: &Match) -> bool {
        self.start_index <= other.end_index && other.start_index <= self.end_index
    }
}

// =============================================================================
// Whole-Word Rule
// =============================================================================

/// A position outside the text, or any character that is not an ASCII
/// Latin letter, separates words
#[inline]
pub fn is_word_boundary(ch: Option<char>) -> bool {
    ch.map_or(true, |c| !c.is_ascii_alphabetic())
}

fn is_whole_word(text: &ScanText<'_>, start: usize, end: usize) -> bool {
    let before = start.checked_sub(1).and_then(|pos| text.char_at(pos));
    let after = text.char_at(end.saturating_add(1));
    is_word_boundary(before) && is_word_boundary(after)
}

// =============================================================================
// Scan
// =============================================================================

/// Scan `text` with `automaton` under `config`.
///
/// The automaton's own case policy applies; `config.case_sensitive` is not
/// consulted here.
pub fn scan(automaton: &KeywordAutomaton, text: &str, config: &ScanConfig) -> Vec<Match> {
    if text.is_empty() || automaton.is_empty() {
        return Vec::new();
    }

    let scan_text = ScanText::new(text);
    let mut results: Vec<Match> = Vec::new();
    let mut node = NodeId::ROOT;

    for step in ZoneCursor::new(&scan_text, config) {
        let pos = match step {
            Step::Zone(_) => {
                node = NodeId::ROOT;
                continue;
            }
            Step::Char(pos) => pos,
        };

        node = automaton.step(node, scan_text.chars()[pos]);
        if !automaton.has_output(node) {
            continue;
        }

        for (keyword, char_len) in automaton.outputs(node) {
            let Some(start) = (pos + 1).checked_sub(char_len) else {
                continue;
            };
            if config.whole_word_only && !is_whole_word(&scan_text, start, pos) {
                continue;
            }
            results.push(Match::new(keyword, start, pos));
        }
    }

    results
}
