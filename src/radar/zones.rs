//! Exclusion Zones: Markup Regions Opaque to Keyword Matching
//!
//! Recognizes the spans of a note block in which keywords must never be
//! reported:
//! - Bare URLs: `https://…`, `www.…`, `domain.tld` (pre-scanned once)
//! - Images: `![alt](url)`
//! - Links: `[text](url)`
//! - Paired markers: `[[…]]`, `((…))`, `{{…}}`, ```` ```…``` ````, `` `…` ``
//! - Tags: `#tag`, `#标签`
//! - Property keys: a leading `key::` with no markup before the `::`
//!
//! Each recognizer is a pure function of `(text, position)`. `ZoneCursor`
//! tries them in priority order at every position and yields either a zone
//! (to be skipped as a hard token break) or a plain character.

use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::config::ScanConfig;

// =============================================================================
// Scan Text
// =============================================================================

/// Character-indexed view of a text, with byte offsets for regex interop
#[derive(Debug, Clone)]
pub struct ScanText<'t> {
    text: &'t str,
    chars: Vec<char>,
    /// Byte offset of every character, plus `text.len()` as a sentinel
    byte_offsets: Vec<usize>,
}

impl<'t> ScanText<'t> {
    pub fn new(text: &'t str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut byte_offsets = Vec::with_capacity(text.len() + 1);
        for (offset, ch) in text.char_indices() {
            chars.push(ch);
            byte_offsets.push(offset);
        }
        byte_offsets.push(text.len());
        Self { text, chars, byte_offsets }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &'t str {
        self.text
    }

    #[inline]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    #[inline]
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    /// Whether `marker` occurs at character position `pos`
    pub fn starts_with(&self, pos: usize, marker: &str) -> bool {
        let mut at = pos;
        for ch in marker.chars() {
            if self.chars.get(at) != Some(&ch) {
                return false;
            }
            at += 1;
        }
        true
    }

    /// Character position of the first `marker` at or after `from`
    pub fn find(&self, from: usize, marker: &str) -> Option<usize> {
        let width = marker.chars().count();
        if width == 0 || from + width > self.len() {
            return None;
        }
        (from..=self.len() - width).find(|&pos| self.starts_with(pos, marker))
    }

    /// Character position of the last `marker` in the text
    pub fn rfind(&self, marker: &str) -> Option<usize> {
        self.text.rfind(marker).map(|byte| self.char_index(byte))
    }

    /// Character index of a byte offset that lies on a char boundary
    #[inline]
    pub fn char_index(&self, byte: usize) -> usize {
        self.byte_offsets.partition_point(|&offset| offset < byte)
    }

    /// Substring between two character positions (`end` exclusive)
    pub fn slice(&self, start: usize, end: usize) -> &'t str {
        let start = start.min(self.len());
        let end = end.clamp(start, self.len());
        &self.text[self.byte_offsets[start]..self.byte_offsets[end]]
    }
}

// =============================================================================
// Zones
// =============================================================================

/// Kind of exclusion zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Url,
    Image,
    Link,
    Paired,
    Tag,
    PropertyKey,
}

impl ZoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Url => "url",
            ZoneKind::Image => "image",
            ZoneKind::Link => "link",
            ZoneKind::Paired => "paired",
            ZoneKind::Tag => "tag",
            ZoneKind::PropertyKey => "property_key",
        }
    }
}

/// A skipped span, in character positions (`end` exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub start: usize,
    pub end: usize,
}

/// A recognizer for one kind of exclusion zone.
///
/// `recognize` returns the exclusive end of a zone starting or covering
/// `pos`, or `None` when the text at `pos` is ordinary.
pub trait ZoneRecognizer {
    fn kind(&self) -> ZoneKind;
    fn recognize(&self, text: &ScanText<'_>, pos: usize) -> Option<usize>;
}

// ==================== URL ====================

fn url_regex() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| {
        Regex::new(concat!(
            r#"(?i)(?:https?://|www\.)[^\s<>()\[\]{}"'`]+"#,
            r"|\b[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*",
            r"\.(?:com|org|net|io|dev|app|edu|gov|co|me|ai|info|xyz|cn|uk|de|jp|fr|ru)\b",
            r#"(?:/[^\s<>()\[\]{}"'`]*)?"#,
        ))
        .expect("URL pattern is valid")
    })
}

/// Bare URLs and domain-like tokens, found in one pass over the whole text
#[derive(Debug, Clone, Default)]
pub struct UrlRecognizer {
    /// Sorted, non-overlapping `(start, end)` character spans
    spans: Vec<(usize, usize)>,
}

impl UrlRecognizer {
    pub fn new(text: &ScanText<'_>) -> Self {
        let spans = url_regex()
            .find_iter(text.as_str())
            .map(|m| (text.char_index(m.start()), text.char_index(m.end())))
            .collect();
        Self { spans }
    }

    pub fn spans(&self) -> &[(usize, usize)] {
        &self.spans
    }
}

impl ZoneRecognizer for UrlRecognizer {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Url
    }

    fn recognize(&self, _text: &ScanText<'_>, pos: usize) -> Option<usize> {
        let idx = self.spans.partition_point(|&(_, end)| end <= pos);
        match self.spans.get(idx) {
            Some(&(start, end)) if start <= pos => Some(end),
            _ => None,
        }
    }
}

// ==================== Images & Links ====================

/// Next position of `]` and `)` at or after every index, built once per text
/// so a missing `](…)` tail is rejected in O(1)
#[derive(Debug, Clone, Default)]
pub struct LinkTails {
    next_bracket: Vec<usize>,
    next_paren: Vec<usize>,
}

impl LinkTails {
    pub fn new(text: &ScanText<'_>) -> Self {
        let len = text.len();
        let mut next_bracket = vec![len; len + 1];
        let mut next_paren = vec![len; len + 1];
        for pos in (0..len).rev() {
            next_bracket[pos] = if text.chars()[pos] == ']' { pos } else { next_bracket[pos + 1] };
            next_paren[pos] = if text.chars()[pos] == ')' { pos } else { next_paren[pos + 1] };
        }
        Self { next_bracket, next_paren }
    }

    fn next(table: &[usize], from: usize) -> Option<usize> {
        let found = *table.get(from)?;
        (found + 1 < table.len()).then_some(found)
    }

    /// `](…)` tail shared by images and links: returns the end past `)`
    fn tail(&self, text: &ScanText<'_>, from: usize) -> Option<usize> {
        let close_bracket = Self::next(&self.next_bracket, from)?;
        if text.char_at(close_bracket + 1) != Some('(') {
            return None;
        }
        let close_paren = Self::next(&self.next_paren, close_bracket + 2)?;
        Some(close_paren + 1)
    }
}

/// `![alt](url)`
#[derive(Debug, Clone)]
pub struct ImageRecognizer {
    tails: Rc<LinkTails>,
}

impl ImageRecognizer {
    pub fn new(tails: Rc<LinkTails>) -> Self {
        Self { tails }
    }
}

impl ZoneRecognizer for ImageRecognizer {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Image
    }

    fn recognize(&self, text: &ScanText<'_>, pos: usize) -> Option<usize> {
        if !text.starts_with(pos, "![") {
            return None;
        }
        self.tails.tail(text, pos + 2)
    }
}

/// `[text](url)` not preceded by `!`
#[derive(Debug, Clone)]
pub struct LinkRecognizer {
    tails: Rc<LinkTails>,
}

impl LinkRecognizer {
    pub fn new(tails: Rc<LinkTails>) -> Self {
        Self { tails }
    }
}

impl ZoneRecognizer for LinkRecognizer {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Link
    }

    fn recognize(&self, text: &ScanText<'_>, pos: usize) -> Option<usize> {
        if text.char_at(pos) != Some('[') {
            return None;
        }
        if pos > 0 && text.char_at(pos - 1) == Some('!') {
            return None;
        }
        self.tails.tail(text, pos + 1)
    }
}

// ==================== Paired Markers ====================

/// Symmetric markers, tried in this order. The fenced block must come
/// before the single backtick.
pub const PAIRED_MARKERS: [(&str, &str); 5] = [
    ("[[", "]]"),
    ("((", "))"),
    ("{{", "}}"),
    ("```", "```"),
    ("`", "`"),
];

/// Paired markers: the whole marked region is opaque, but only when the
/// closer occurs later in the text
#[derive(Debug, Clone)]
pub struct PairedMarkerRecognizer {
    /// Last position of each closer, so an unclosed opener fails in O(1)
    last_closer: [Option<usize>; PAIRED_MARKERS.len()],
}

impl PairedMarkerRecognizer {
    pub fn new(text: &ScanText<'_>) -> Self {
        let mut last_closer = [None; PAIRED_MARKERS.len()];
        for (slot, (_, close)) in last_closer.iter_mut().zip(PAIRED_MARKERS.iter()) {
            *slot = text.rfind(close);
        }
        Self { last_closer }
    }
}

impl ZoneRecognizer for PairedMarkerRecognizer {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Paired
    }

    fn recognize(&self, text: &ScanText<'_>, pos: usize) -> Option<usize> {
        for ((open, close), last) in PAIRED_MARKERS.iter().zip(self.last_closer.iter()) {
            if !text.starts_with(pos, open) {
                continue;
            }
            let from = pos + open.chars().count();
            match last {
                Some(last) if *last >= from => {}
                _ => continue,
            }
            if let Some(close_at) = text.find(from, close) {
                return Some(close_at + close.chars().count());
            }
        }
        None
    }
}

// ==================== Tags ====================

fn tag_body_regex() -> &'static Regex {
    static TAG_BODY_RE: OnceLock<Regex> = OnceLock::new();
    TAG_BODY_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.\-\p{Han}]*").expect("tag pattern is valid")
    })
}

/// `#tag` at the start of the text or after whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct TagRecognizer;

impl ZoneRecognizer for TagRecognizer {
    fn kind(&self) -> ZoneKind {
        ZoneKind::Tag
    }

    fn recognize(&self, text: &ScanText<'_>, pos: usize) -> Option<usize> {
        if text.char_at(pos) != Some('#') {
            return None;
        }
        if pos > 0 && !text.char_at(pos - 1).is_some_and(char::is_whitespace) {
            return None;
        }
        let rest = text.slice(pos + 1, text.len());
        let body = tag_body_regex().find(rest).map_or(0, |m| m.as_str().chars().count());
        Some(pos + 1 + body)
    }
}

// ==================== Property Keys ====================

/// Markup whose presence before `::` marks the prefix as formatted text.
/// `#`, `>`, the fence and newlines only classify; they never skip.
pub const MARKDOWN_MARKERS: [&str; 17] = [
    "[[", "]]", "((", "))", "{{", "}}", "```", "`", "**", "__", "~~", "^^", "![", "](", "#", ">",
    "\n",
];

/// End of a leading `key::` prefix, if the text has one free of markup
pub fn property_prefix_end(text: &ScanText<'_>) -> Option<usize> {
    let separator = text.as_str().find("::")?;
    let key = &text.as_str()[..separator];
    if MARKDOWN_MARKERS.iter().any(|marker| key.contains(marker)) {
        return None;
    }
    Some(text.char_index(separator) + 2)
}

// =============================================================================
// Zone Cursor
// =============================================================================

/// One step of the zone walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A span to skip; the automaton resets to root
    Zone(Zone),
    /// An ordinary character position, fed to the automaton
    Char(usize),
}

/// Recognizers in priority order for one text
pub fn default_recognizers(text: &ScanText<'_>, config: &ScanConfig) -> Vec<Box<dyn ZoneRecognizer>> {
    let mut recognizers: Vec<Box<dyn ZoneRecognizer>> = Vec::with_capacity(5);
    if config.recognize_urls {
        recognizers.push(Box::new(UrlRecognizer::new(text)));
    }
    let tails = Rc::new(LinkTails::new(text));
    recognizers.push(Box::new(ImageRecognizer::new(Rc::clone(&tails))));
    recognizers.push(Box::new(LinkRecognizer::new(tails)));
    recognizers.push(Box::new(PairedMarkerRecognizer::new(text)));
    recognizers.push(Box::new(TagRecognizer));
    recognizers
}

/// Left-to-right walk interleaving zones and plain characters
pub struct ZoneCursor<'a, 't> {
    text: &'a ScanText<'t>,
    recognizers: Vec<Box<dyn ZoneRecognizer>>,
    prefix: Option<Zone>,
    pos: usize,
}

impl<'a, 't> ZoneCursor<'a, 't> {
    pub fn new(text: &'a ScanText<'t>, config: &ScanConfig) -> Self {
        let prefix = if config.recognize_colon_prefix {
            property_prefix_end(text).map(|end| Zone {
                kind: ZoneKind::PropertyKey,
                start: 0,
                end,
            })
        } else {
            None
        };

        Self::with_recognizers(text, default_recognizers(text, config), prefix)
    }

    pub fn with_recognizers(
        text: &'a ScanText<'t>,
        recognizers: Vec<Box<dyn ZoneRecognizer>>,
        prefix: Option<Zone>,
    ) -> Self {
        Self {
            text,
            recognizers,
            prefix,
            pos: 0,
        }
    }
}

impl Iterator for ZoneCursor<'_, '_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if let Some(zone) = self.prefix.take() {
            self.pos = zone.end;
            return Some(Step::Zone(zone));
        }

        let pos = self.pos;
        if pos >= self.text.len() {
            return None;
        }

        for recognizer in &self.recognizers {
            if let Some(end) = recognizer.recognize(self.text, pos) {
                let end = end.clamp(pos + 1, self.text.len());
                self.pos = end;
                return Some(Step::Zone(Zone {
                    kind: recognizer.kind(),
                    start: pos,
                    end,
                }));
            }
        }

        self.pos = pos + 1;
        Some(Step::Char(pos))
    }
}

/// All exclusion zones of `text`, in order
pub fn exclusion_zones(text: &str, config: &ScanConfig) -> Vec<Zone> {
    let scan_text = ScanText::new(text);
    ZoneCursor::new(&scan_text, config)
        .filter_map(|step| match step {
            Step::Zone(zone) => Some(zone),
            Step::Char(_) => None,
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(text: &str) -> Vec<(ZoneKind, String)> {
        let scan_text = ScanText::new(text);
        exclusion_zones(text, &ScanConfig::default())
            .into_iter()
            .map(|zone| (zone.kind, scan_text.slice(zone.start, zone.end).to_string()))
            .collect()
    }

    #[test]
    fn test_scan_text_char_indexing() {
        let text = ScanText::new("日本 cat");
        assert_eq!(text.len(), 6);
        assert_eq!(text.char_at(3), Some('c'));
        assert_eq!(text.char_index("日本 ".len()), 3);
        assert_eq!(text.slice(3, 6), "cat");
        assert_eq!(text.find(0, "at"), Some(4));
        assert_eq!(text.rfind("本"), Some(1));
        assert_eq!(text.find(5, "at"), None);
    }

    #[test]
    fn test_wikilink_zone() {
        assert_eq!(zones("see [[cat]] and"), vec![(ZoneKind::Paired, "[[cat]]".to_string())]);
    }

    #[test]
    fn test_block_ref_and_macro_zones() {
        assert_eq!(
            zones("((abc123)) {{embed}}"),
            vec![
                (ZoneKind::Paired, "((abc123))".to_string()),
                (ZoneKind::Paired, "{{embed}}".to_string()),
            ]
        );
    }

    #[test]
    fn test_code_zones() {
        assert_eq!(
            zones("```let cat``` and `cat`"),
            vec![
                (ZoneKind::Paired, "```let cat```".to_string()),
                (ZoneKind::Paired, "`cat`".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclosed_opener_is_plain_text() {
        assert!(zones("a [[cat without end").is_empty());
        assert!(zones("tick ` alone").is_empty());
    }

    #[test]
    fn test_closer_before_opener_does_not_count() {
        assert!(zones("]] then [[cat").is_empty());
    }

    #[test]
    fn test_image_zone() {
        assert_eq!(
            zones("look ![a cat](cat.png) here"),
            vec![(ZoneKind::Image, "![a cat](cat.png)".to_string())]
        );
    }

    #[test]
    fn test_link_zone() {
        assert_eq!(
            zones("a [cat site](https://x.org/c) b"),
            vec![(ZoneKind::Link, "[cat site](https://x.org/c)".to_string())]
        );
    }

    #[test]
    fn test_bracket_without_paren_is_not_link() {
        assert!(zones("[cat] is here").is_empty());
    }

    #[test]
    fn test_incomplete_link_tails_are_plain() {
        assert!(zones("[cat](x").is_empty());
        assert!(zones("![cat](x").is_empty());
        // The `[` after `!` must not fall back to a plain link either.
        assert!(zones("![cat] x").is_empty());
        assert!(zones("[cat] (x)").is_empty());
    }

    #[test]
    fn test_link_tail_lookup() {
        let text = ScanText::new("a](b) ]");
        let tails = LinkTails::new(&text);
        assert_eq!(tails.tail(&text, 0), Some(5));
        assert_eq!(tails.tail(&text, 2), None);
        assert_eq!(tails.tail(&text, 7), None);
        assert_eq!(tails.tail(&text, 100), None);
    }

    #[test]
    fn test_many_unclosed_openers_scan_linearly() {
        let n = 100_000;
        let text = format!("{}]", "[".repeat(n));
        let started = std::time::Instant::now();
        let zones = exclusion_zones(&text, &ScanConfig::default());
        assert!(zones.is_empty());

        let text = format!("{}]", "![".repeat(n));
        assert!(exclusion_zones(&text, &ScanConfig::default()).is_empty());
        assert!(
            started.elapsed() < std::time::Duration::from_secs(5),
            "zone walk took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn test_tag_zones() {
        assert_eq!(
            zones("#cat and #日本語-notes but a#b"),
            vec![
                (ZoneKind::Tag, "#cat".to_string()),
                (ZoneKind::Tag, "#日本語-notes".to_string()),
            ]
        );
    }

    #[test]
    fn test_tag_before_wikilink_skips_hash_only() {
        assert_eq!(
            zones("#[[cat]]"),
            vec![
                (ZoneKind::Tag, "#".to_string()),
                (ZoneKind::Paired, "[[cat]]".to_string()),
            ]
        );
    }

    #[test]
    fn test_url_zones() {
        assert_eq!(
            zones("visit cat.com or https://example.org/a?b=c and www.cats.io"),
            vec![
                (ZoneKind::Url, "cat.com".to_string()),
                (ZoneKind::Url, "https://example.org/a?b=c".to_string()),
                (ZoneKind::Url, "www.cats.io".to_string()),
            ]
        );
    }

    #[test]
    fn test_url_without_known_tld_is_plain() {
        assert!(zones("notes.md and e.g. this").is_empty());
    }

    #[test]
    fn test_url_recognizer_covers_interior() {
        let text = ScanText::new("go cat.com now");
        let urls = UrlRecognizer::new(&text);
        assert_eq!(urls.spans(), &[(3, 10)]);
        assert_eq!(urls.recognize(&text, 2), None);
        assert_eq!(urls.recognize(&text, 3), Some(10));
        assert_eq!(urls.recognize(&text, 6), Some(10));
        assert_eq!(urls.recognize(&text, 10), None);
    }

    #[test]
    fn test_url_path_stops_at_markup() {
        assert_eq!(
            zones("https://a.com/`x` y`"),
            vec![(ZoneKind::Url, "https://a.com/".to_string()), (ZoneKind::Paired, "`x`".to_string())]
        );
    }

    #[test]
    fn test_url_takes_precedence_over_image() {
        // The URL claims the `!`, so the bracket that follows is plain text.
        assert_eq!(
            zones("http://x.io/![a](b)"),
            vec![(ZoneKind::Url, "http://x.io/!".to_string())]
        );
    }

    #[test]
    fn test_url_recognition_can_be_disabled() {
        let config = ScanConfig {
            recognize_urls: false,
            ..ScanConfig::default()
        };
        assert!(exclusion_zones("visit cat.com", &config).is_empty());
    }

    #[test]
    fn test_property_prefix() {
        assert_eq!(
            zones("project:: [[cat]]"),
            vec![
                (ZoneKind::PropertyKey, "project::".to_string()),
                (ZoneKind::Paired, "[[cat]]".to_string()),
            ]
        );
    }

    #[test]
    fn test_property_prefix_disabled_by_markup() {
        assert!(property_prefix_end(&ScanText::new("**bold**:: cat")).is_none());
        assert!(property_prefix_end(&ScanText::new("# heading:: cat")).is_none());
        assert!(property_prefix_end(&ScanText::new("line\nkey:: cat")).is_none());
        assert_eq!(property_prefix_end(&ScanText::new("key:: cat")), Some(5));
        assert_eq!(property_prefix_end(&ScanText::new("no separator")), None);
    }

    #[test]
    fn test_property_prefix_can_be_disabled() {
        let config = ScanConfig {
            recognize_colon_prefix: false,
            ..ScanConfig::default()
        };
        assert!(exclusion_zones("key:: value", &config).is_empty());
    }

    #[test]
    fn test_cursor_yields_every_position_once() {
        let scan_text = ScanText::new("a [[b]] c");
        let steps: Vec<Step> = ZoneCursor::new(&scan_text, &ScanConfig::default()).collect();
        assert_eq!(
            steps,
            vec![
                Step::Char(0),
                Step::Char(1),
                Step::Zone(Zone { kind: ZoneKind::Paired, start: 2, end: 7 }),
                Step::Char(7),
                Step::Char(8),
            ]
        );
    }
}
