//! Linker: Turns Found Keywords into `[[Page]]` References
//!
//! Text-level operations behind the radar's actions:
//! - `link_match`: link a single occurrence (the per-keyword menu action)
//! - `link_all`: link every group with its longest keyword ("Link All")
//! - `segments`: split a block into plain runs and keyword groups for inline
//!   rendering

use serde::{Deserialize, Serialize};

use super::grouper::KeywordGroup;
use super::scanner::Match;
use super::zones::ScanText;

/// Wrap a title as a page reference
pub fn page_ref(title: &str) -> String {
    format!("[[{}]]", title)
}

/// Replace one matched span with a reference to its keyword
pub fn link_match(text: &str, m: &Match) -> String {
    let source = ScanText::new(text);
    format!(
        "{}{}{}",
        source.slice(0, m.start_index),
        page_ref(&m.keyword),
        source.slice(m.end_index.saturating_add(1), source.len())
    )
}

/// Replace every group span with a reference to the group's longest keyword
pub fn link_all(text: &str, groups: &[KeywordGroup]) -> String {
    let source = ScanText::new(text);
    let mut ordered: Vec<&KeywordGroup> = groups.iter().collect();
    ordered.sort_by_key(|g| g.start);

    let mut linked = String::with_capacity(text.len() + groups.len() * 4);
    let mut cursor = 0;
    for g in ordered {
        let Some(longest) = g.longest_keyword() else {
            continue;
        };
        if g.start < cursor {
            continue;
        }
        linked.push_str(source.slice(cursor, g.start));
        linked.push_str(&page_ref(&longest.keyword));
        cursor = g.end.saturating_add(1);
    }
    linked.push_str(source.slice(cursor, source.len()));
    linked
}

/// A run of block text for inline rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Plain { text: String },
    /// `group` indexes the slice passed to `segments`
    Keyword { group: usize, text: String },
}

/// Split `text` into plain runs and keyword groups, in text order.
///
/// Empty plain runs are omitted.
pub fn segments(text: &str, groups: &[KeywordGroup]) -> Vec<Segment> {
    let source = ScanText::new(text);
    let mut ordered: Vec<(usize, &KeywordGroup)> = groups.iter().enumerate().collect();
    ordered.sort_by_key(|(_, g)| g.start);

    let mut out: Vec<Segment> = Vec::with_capacity(groups.len() * 2 + 1);
    let mut cursor = 0;
    for (index, g) in ordered {
        if g.start < cursor {
            continue;
        }
        if g.start > cursor {
            out.push(Segment::Plain {
                text: source.slice(cursor, g.start).to_string(),
            });
        }
        out.push(Segment::Keyword {
            group: index,
            text: g.text.clone(),
        });
        cursor = g.end.saturating_add(1);
    }
    if cursor < source.len() {
        out.push(Segment::Plain {
            text: source.slice(cursor, source.len()).to_string(),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::grouper::group;
    use crate::radar::KeywordAutomaton;

    #[test]
    fn test_link_match() {
        let text = "read about cats today";
        let m = Match::new("cats", 11, 14);
        assert_eq!(link_match(text, &m), "read about [[cats]] today");
    }

    #[test]
    fn test_link_match_keeps_original_case_keyword() {
        let text = "the CAT sat";
        let m = Match::new("Cat", 4, 6);
        assert_eq!(link_match(text, &m), "the [[Cat]] sat");
    }

    #[test]
    fn test_link_match_multibyte() {
        let text = "我的笔记本";
        let m = Match::new("笔记", 2, 3);
        assert_eq!(link_match(text, &m), "我的[[笔记]]本");
    }

    #[test]
    fn test_link_all_uses_longest_keyword() {
        let automaton = KeywordAutomaton::build(["cat", "cats", "dog"], true);
        let text = "cats and a dog";
        let matches = automaton.search(text, false);
        let groups = group(&matches, text);
        assert_eq!(link_all(text, &groups), "[[cats]] and a [[dog]]");
    }

    #[test]
    fn test_link_all_without_groups_is_identity() {
        assert_eq!(link_all("nothing here", &[]), "nothing here");
    }

    #[test]
    fn test_span_at_usize_max_is_clamped() {
        let text = "abc";
        let m = Match::new("b", 1, usize::MAX);
        assert_eq!(link_match(text, &m), "a[[b]]");

        let groups = group(&[m], text);
        assert_eq!(link_all(text, &groups), "a[[b]]");
        assert_eq!(
            segments(text, &groups),
            vec![
                Segment::Plain { text: "a".to_string() },
                Segment::Keyword { group: 0, text: "bc".to_string() },
            ]
        );
    }

    #[test]
    fn test_segments_layout() {
        let automaton = KeywordAutomaton::build(["cat", "dog"], true);
        let text = "cat and dog!";
        let groups = group(&automaton.search(text, false), text);
        assert_eq!(
            segments(text, &groups),
            vec![
                Segment::Keyword { group: 0, text: "cat".to_string() },
                Segment::Plain { text: " and ".to_string() },
                Segment::Keyword { group: 1, text: "dog".to_string() },
                Segment::Plain { text: "!".to_string() },
            ]
        );
    }

    #[test]
    fn test_segments_without_groups() {
        assert_eq!(
            segments("plain", &[]),
            vec![Segment::Plain { text: "plain".to_string() }]
        );
        assert!(segments("", &[]).is_empty());
    }
}
