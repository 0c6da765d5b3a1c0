//! KeywordAutomaton: Arena-Backed Aho-Corasick over Page Titles
//!
//! Builds a trie of keywords in a flat node arena, annotates it with failure
//! links breadth-first, and exposes the O(1) amortized transition used by the
//! scanner. Nodes are addressed by `NodeId`, so the finished automaton is a
//! plain immutable value that can be shared across threads.
//!
//! Output lists are finalized during the failure-link pass: a node's own
//! keywords come first, followed by everything inherited from its failure
//! node. When several keywords end at the same position they are reported in
//! that order.

use std::collections::{HashSet, VecDeque};

use super::config::ScanConfig;
use super::scanner::{scan, Match};

// =============================================================================
// Types
// =============================================================================

/// Index of a node in the automaton arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node: no incoming edge, its own failure link
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the keyword table
type KeywordId = u32;

#[derive(Debug, Clone)]
struct Node {
    /// Outgoing trie edges, sorted by character
    children: Vec<(char, NodeId)>,
    failure: NodeId,
    /// Own keywords first, then those inherited through `failure`
    output: Vec<KeywordId>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: Vec::new(),
            failure: NodeId::ROOT,
            output: Vec::new(),
        }
    }

    #[inline]
    fn child(&self, ch: char) -> Option<NodeId> {
        self.children
            .binary_search_by_key(&ch, |&(c, _)| c)
            .ok()
            .map(|pos| self.children[pos].1)
    }
}

/// A dictionary entry: the original keyword and its length in characters
#[derive(Debug, Clone)]
struct KeywordEntry {
    text: String,
    char_len: usize,
}

/// Fold one character to lowercase for case-insensitive indexing.
///
/// Characters whose lowercase form expands to several characters are kept
/// as they are, so folding never changes a keyword's character length.
#[inline]
pub fn fold_char(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(folded), None) => folded,
        _ => ch,
    }
}

// =============================================================================
// KeywordAutomaton
// =============================================================================

/// Multi-pattern keyword matcher.
///
/// Immutable once built; rebuild a new one whenever the dictionary changes.
#[derive(Debug, Clone)]
pub struct KeywordAutomaton {
    nodes: Vec<Node>,
    keywords: Vec<KeywordEntry>,
    case_sensitive: bool,
}

impl Default for KeywordAutomaton {
    fn default() -> Self {
        Self::build(std::iter::empty::<&str>(), true)
    }
}

impl KeywordAutomaton {
    /// Build an automaton from a keyword list.
    ///
    /// Empty strings are dropped and duplicates are indexed once, keeping the
    /// first occurrence. With `case_sensitive == false` the trie is indexed on
    /// folded characters while matches still report the original keyword.
    pub fn build<I, S>(keywords: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut automaton = Self {
            nodes: vec![Node::new()],
            keywords: Vec::new(),
            case_sensitive,
        };

        let mut seen: HashSet<String> = HashSet::new();
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if keyword.is_empty() || !seen.insert(keyword.to_string()) {
                continue;
            }
            automaton.insert(keyword);
        }

        if !automaton.keywords.is_empty() {
            automaton.build_failure_links();
        }
        automaton
    }

    fn insert(&mut self, keyword: &str) {
        let mut node = NodeId::ROOT;
        let mut char_len = 0;
        for ch in keyword.chars() {
            node = self.child_or_insert(node, self.fold(ch));
            char_len += 1;
        }

        let id = self.keywords.len() as KeywordId;
        self.keywords.push(KeywordEntry {
            text: keyword.to_string(),
            char_len,
        });
        self.nodes[node.index()].output.push(id);
    }

    fn child_or_insert(&mut self, parent: NodeId, ch: char) -> NodeId {
        let children = &self.nodes[parent.index()].children;
        match children.binary_search_by_key(&ch, |&(c, _)| c) {
            Ok(pos) => children[pos].1,
            Err(pos) => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Node::new());
                self.nodes[parent.index()].children.insert(pos, (ch, id));
                id
            }
        }
    }

    /// Breadth-first failure-link construction.
    ///
    /// A node's failure target is strictly shallower, so BFS order guarantees
    /// its output list is final before it is inherited.
    fn build_failure_links(&mut self) {
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        self.nodes[NodeId::ROOT.index()].failure = NodeId::ROOT;
        for &(_, child) in &self.nodes[NodeId::ROOT.index()].children {
            queue.push_back(child);
        }
        for &child in &queue {
            self.nodes[child.index()].failure = NodeId::ROOT;
        }

        while let Some(current) = queue.pop_front() {
            for edge in 0..self.nodes[current.index()].children.len() {
                let (ch, child) = self.nodes[current.index()].children[edge];

                let mut candidate = self.nodes[current.index()].failure;
                let target = loop {
                    if let Some(next) = self.nodes[candidate.index()].child(ch) {
                        break next;
                    }
                    if candidate == NodeId::ROOT {
                        break NodeId::ROOT;
                    }
                    candidate = self.nodes[candidate.index()].failure;
                };

                let inherited = self.nodes[target.index()].output.clone();
                let node = &mut self.nodes[child.index()];
                node.failure = target;
                node.output.extend(inherited);
                debug_assert!(
                    {
                        let mut ids = node.output.clone();
                        ids.sort_unstable();
                        ids.windows(2).all(|w| w[0] != w[1])
                    },
                    "output list inherited a keyword twice"
                );

                queue.push_back(child);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Apply the automaton's case policy to one character
    #[inline]
    pub fn fold(&self, ch: char) -> char {
        if self.case_sensitive {
            ch
        } else {
            fold_char(ch)
        }
    }

    /// Standard Aho-Corasick transition on a (not yet folded) character.
    ///
    /// Follows failure links until a node with a child on `ch` is found,
    /// falling back to the root.
    #[inline]
    pub fn step(&self, mut node: NodeId, ch: char) -> NodeId {
        let ch = self.fold(ch);
        loop {
            let current = &self.nodes[node.index()];
            if let Some(next) = current.child(ch) {
                return next;
            }
            if node == NodeId::ROOT {
                return NodeId::ROOT;
            }
            node = current.failure;
        }
    }

    /// Keywords recognized at `node`, with their length in characters
    pub fn outputs(&self, node: NodeId) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.nodes[node.index()].output.iter().map(move |&id| {
            let entry = &self.keywords[id as usize];
            (entry.text.as_str(), entry.char_len)
        })
    }

    /// Whether any keyword ends at `node`
    #[inline]
    pub fn has_output(&self, node: NodeId) -> bool {
        !self.nodes[node.index()].output.is_empty()
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Find every keyword occurrence in `text`.
    ///
    /// Markup zones, bare URLs and a leading `key::` prefix are excluded.
    pub fn search(&self, text: &str, whole_word_only: bool) -> Vec<Match> {
        let config = ScanConfig {
            case_sensitive: self.case_sensitive,
            whole_word_only,
            ..ScanConfig::default()
        };
        scan(self, text, &config)
    }

    /// Find every keyword occurrence in `text` under an explicit policy.
    ///
    /// `config.case_sensitive` is ignored; case handling is fixed at build.
    pub fn scan(&self, text: &str, config: &ScanConfig) -> Vec<Match> {
        scan(self, text, config)
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Indexed keywords in insertion order
    pub fn keywords(&self) -> impl Iterator<Item = &str> + '_ {
        self.keywords.iter().map(|entry| entry.text.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
