//! Matched minutia pairs and their extraction from a matcher pairing graph.
//!
//! A pairing graph is rooted at one anchor pair and grows through edges, each
//! of which observes two pairs (its `from` and `to` endpoints). The same
//! candidate minutia may be observed many times; extraction keeps the first
//! observation of each candidate index and drops the rest.

use std::collections::HashSet;

/// Probe/candidate minutia index pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatchedPair {
    /// Index into the probe template's minutiae.
    pub probe: usize,
    /// Index into the candidate template's minutiae.
    pub candidate: usize,
}

impl MatchedPair {
    /// Creates a pair.
    pub fn new(probe: usize, candidate: usize) -> Self {
        Self { probe, candidate }
    }
}

/// Extension edge of a pairing graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairingEdge {
    /// Pair the edge extends from.
    pub from: MatchedPair,
    /// Pair the edge extends to.
    pub to: MatchedPair,
}

impl PairingEdge {
    /// Creates an edge between two pairs.
    pub fn new(from: MatchedPair, to: MatchedPair) -> Self {
        Self { from, to }
    }
}

/// Matcher pairing result: a root pair plus extension edges in visit order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairingGraph {
    /// Anchor pair the graph grew from.
    pub root: MatchedPair,
    /// Extension edges in the order the matcher added them.
    pub edges: Vec<PairingEdge>,
}

impl PairingGraph {
    /// Creates a graph with no extensions.
    pub fn new(root: MatchedPair) -> Self {
        Self {
            root,
            edges: Vec::new(),
        }
    }

    /// Appends an extension edge.
    pub fn with_edge(mut self, from: MatchedPair, to: MatchedPair) -> Self {
        self.edges.push(PairingEdge::new(from, to));
        self
    }

    /// Iterates over every pair observation: the root, then each edge's
    /// `from` and `to` pairs.
    pub fn observations(&self) -> impl Iterator<Item = MatchedPair> + '_ {
        std::iter::once(self.root).chain(
            self.edges
                .iter()
                .flat_map(|edge| [edge.from, edge.to].into_iter()),
        )
    }
}

/// Extracts the deduplicated pair list from a pairing graph.
///
/// Output order is first-seen order, so the root pair always comes first.
pub fn extract_pairs(graph: &PairingGraph) -> Vec<MatchedPair> {
    dedup_pairs(graph.observations())
}

/// Keeps the first observation of each candidate index, preserving order.
pub fn dedup_pairs<I>(observations: I) -> Vec<MatchedPair>
where
    I: IntoIterator<Item = MatchedPair>,
{
    let mut seen = HashSet::new();
    observations
        .into_iter()
        .filter(|pair| seen.insert(pair.candidate))
        .collect()
}
