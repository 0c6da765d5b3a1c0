//! Grouper: Clusters Overlapping Matches into Keyword Groups
//!
//! Matches are nodes of an undirected interval-overlap graph. Each connected
//! component becomes one group covering the union of its spans, so chains of
//! overlaps (`[0,2]`, `[1,4]`, `[4,6]`) collapse into a single annotation.
//!
//! Edges come from a sweep over matches sorted by start, which only pairs
//! intervals that actually overlap. Components are discovered breadth-first
//! from the first unvisited match in input order.

use rustworkx_core::petgraph::graph::{NodeIndex, UnGraph};
use rustworkx_core::petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

use super::scanner::Match;
use super::zones::ScanText;

/// A maximal cluster of transitively overlapping matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordGroup {
    /// Member matches, in input order
    pub keywords: Vec<Match>,
    /// Smallest `start_index` of the members
    pub start: usize,
    /// Largest `end_index` of the members (inclusive)
    pub end: usize,
    /// `source[start..=end]`
    pub text: String,
}

impl KeywordGroup {
    /// The first of the longest keywords in the group
    pub fn longest_keyword(&self) -> Option<&Match> {
        let mut longest: Option<(&Match, usize)> = None;
        for candidate in &self.keywords {
            let len = candidate.keyword.chars().count();
            if longest.map_or(true, |(_, best)| len > best) {
                longest = Some((candidate, len));
            }
        }
        longest.map(|(m, _)| m)
    }
}

/// Build the overlap graph: node `i` is `matches[i]`
fn overlap_graph(matches: &[Match]) -> UnGraph<(), ()> {
    let mut graph: UnGraph<(), ()> = UnGraph::with_capacity(matches.len(), matches.len());
    for _ in matches {
        graph.add_node(());
    }

    let mut by_start: Vec<usize> = (0..matches.len()).collect();
    by_start.sort_by_key(|&i| (matches[i].start_index, matches[i].end_index));

    // Matches that started earlier and may still overlap what comes next
    let mut active: Vec<usize> = Vec::new();
    for &current in &by_start {
        let start = matches[current].start_index;
        active.retain(|&open| matches[open].end_index >= start);
        for &open in &active {
            graph.add_edge(NodeIndex::new(open), NodeIndex::new(current), ());
        }
        active.push(current);
    }

    graph
}

/// Partition `matches` into groups of transitively overlapping spans.
///
/// `source_text` must be the text the matches were found in; spans beyond
/// its end are clamped.
pub fn group(matches: &[Match], source_text: &str) -> Vec<KeywordGroup> {
    if matches.is_empty() {
        return Vec::new();
    }

    let graph = overlap_graph(matches);
    let source = ScanText::new(source_text);
    let mut visited = vec![false; matches.len()];
    let mut groups: Vec<KeywordGroup> = Vec::new();

    for seed in 0..matches.len() {
        if visited[seed] {
            continue;
        }

        let mut members: Vec<usize> = Vec::new();
        let mut bfs = Bfs::new(&graph, NodeIndex::new(seed));
        while let Some(node) = bfs.next(&graph) {
            visited[node.index()] = true;
            members.push(node.index());
        }
        members.sort_unstable();

        let start = members.iter().map(|&i| matches[i].start_index).min().unwrap_or(0);
        let end = members.iter().map(|&i| matches[i].end_index).max().unwrap_or(start);

        groups.push(KeywordGroup {
            keywords: members.iter().map(|&i| matches[i].clone()).collect(),
            start,
            end,
            text: source.slice(start, end.saturating_add(1)).to_string(),
        });
    }

    groups
}
