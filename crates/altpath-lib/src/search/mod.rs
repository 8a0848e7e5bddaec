//! Goal-directed search engines.
//!
//! Two interchangeable strategies implement the [`PathSearch`] trait:
//!
//! - [`UnidirectionalSearch`] - classic weighted A* from start to goal
//! - [`BidirectionalSearch`] - two concurrent A* frontiers meeting in the middle
//!
//! Both work on dense indices and reuse a [`SearchBuffers`] lane for their
//! per-node state. Mapping between external ids and indices happens in
//! [`crate::engine`].

mod bidirectional;
pub mod buffers;
mod unidirectional;

pub use bidirectional::BidirectionalSearch;
pub use buffers::{BufferPool, Parent, PooledBuffers, SearchBuffers};
pub use unidirectional::UnidirectionalSearch;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::graph::{Graph, NodeId};
use crate::heuristic::Heuristic;

/// Search strategy selectable per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// Single A* frontier from start to goal.
    Unidirectional,
    /// Forward and backward A* frontiers running on two threads.
    #[default]
    Bidirectional,
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SearchEngine::Unidirectional => "unidirectional",
            SearchEngine::Bidirectional => "bidirectional",
        };
        f.write_str(value)
    }
}

impl FromStr for SearchEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unidirectional" | "uni" => Ok(SearchEngine::Unidirectional),
            "bidirectional" | "bi" => Ok(SearchEngine::Bidirectional),
            other => Err(format!(
                "unknown search engine '{other}' (expected unidirectional or bidirectional)"
            )),
        }
    }
}

/// Optional bounds applied to a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Wall-clock budget. When it runs out the search stops and reports the
    /// best path found so far, if any.
    pub timeout: Option<Duration>,
}

impl SearchLimits {
    /// Limits with only a wall-clock budget.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| Instant::now() + timeout)
    }
}

/// How a search finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// A path was found and proven within the weight bound.
    Found,
    /// Every reachable candidate was explored without connecting the endpoints.
    Exhausted,
    /// The deadline passed; any path reported is the best seen until then.
    TimedOut,
}

/// Inputs shared by every search over one graph.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    pub graph: &'a Graph,
    pub heuristic: Heuristic<'a>,
    /// Multiplier applied to the heuristic, `>= 1.0`.
    pub weight: f64,
    pub limits: SearchLimits,
}

/// Dense-index result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub state: SearchState,
    /// Dense indices from start to goal inclusive; empty when no path.
    pub path: Vec<u32>,
    /// Sum of edge weights along `path`, `-1` when no path.
    pub cost: i32,
    /// Nodes popped and expanded across all frontiers.
    pub expanded: usize,
}

impl SearchOutcome {
    fn not_found(state: SearchState, expanded: usize) -> Self {
        Self {
            state,
            path: Vec::new(),
            cost: -1,
            expanded,
        }
    }
}

/// Trait for search strategies.
pub trait PathSearch: Send + Sync {
    /// The engine identifier for this strategy.
    fn engine(&self) -> SearchEngine;

    /// Find a path between two distinct dense indices.
    fn search(
        &self,
        context: &SearchContext<'_>,
        buffers: &mut SearchBuffers,
        start: u32,
        goal: u32,
    ) -> SearchOutcome;
}

/// Select the strategy for an engine choice.
pub fn select_search(engine: SearchEngine) -> Box<dyn PathSearch> {
    match engine {
        SearchEngine::Unidirectional => Box::new(UnidirectionalSearch),
        SearchEngine::Bidirectional => Box::new(BidirectionalSearch),
    }
}

/// Result of a shortest-path query in external ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResult {
    /// Total path cost, `-1` when no path exists.
    pub total_cost: i32,
    /// Number of nodes on the path.
    pub node_count: usize,
    /// External ids from start to end inclusive.
    pub path: Vec<NodeId>,
}

impl PathResult {
    /// Sentinel for an unreachable or unknown endpoint.
    pub fn no_path() -> Self {
        Self {
            total_cost: -1,
            node_count: 0,
            path: Vec::new(),
        }
    }

    /// Result for `start == end`: zero cost and an empty path.
    pub fn trivial() -> Self {
        Self {
            total_cost: 0,
            node_count: 0,
            path: Vec::new(),
        }
    }

    /// Wrap a reconstructed path and its cost.
    pub fn from_path(path: Vec<NodeId>, total_cost: i32) -> Self {
        Self {
            total_cost,
            node_count: path.len(),
            path,
        }
    }

    /// Whether a path (possibly trivial) was found.
    pub fn is_found(&self) -> bool {
        self.total_cost >= 0
    }
}

/// Priority key `g + floor(weight * h)`.
#[inline]
pub(crate) fn priority(g: i32, h: i32, weight: f64) -> i64 {
    i64::from(g) + (f64::from(h) * weight) as i64
}

/// Reads the clock once every `INTERVAL` ticks.
pub(crate) struct DeadlineCheck {
    deadline: Option<Instant>,
    ticks: u32,
}

impl DeadlineCheck {
    const INTERVAL: u32 = 256;

    pub(crate) fn new(limits: &SearchLimits) -> Self {
        Self {
            deadline: limits.deadline(),
            ticks: 0,
        }
    }

    pub(crate) fn expired(&mut self) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        self.ticks = self.ticks.wrapping_add(1);
        self.ticks % Self::INTERVAL == 0 && Instant::now() >= deadline
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct QueueEntry {
    pub node: u32,
    pub g: i32,
    pub f: i64,
}

impl QueueEntry {
    pub(crate) fn new(node: u32, g: i32, f: i64) -> Self {
        Self { node, g, f }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by priority.
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn queue_pops_lowest_priority_first() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(1, 5, 9));
        heap.push(QueueEntry::new(2, 1, 3));
        heap.push(QueueEntry::new(3, 2, 3));
        // Ties on f prefer the deeper entry.
        assert_eq!(heap.pop().map(|e| e.node), Some(3));
        assert_eq!(heap.pop().map(|e| e.node), Some(2));
        assert_eq!(heap.pop().map(|e| e.node), Some(1));
    }

    #[test]
    fn priority_floors_weighted_heuristic() {
        assert_eq!(priority(10, 3, 1.0), 13);
        assert_eq!(priority(10, 3, 1.5), 14);
        assert_eq!(priority(0, 0, 2.0), 0);
    }

    #[test]
    fn engine_parses_short_and_long_names() {
        assert_eq!("bi".parse::<SearchEngine>(), Ok(SearchEngine::Bidirectional));
        assert_eq!(
            "Unidirectional".parse::<SearchEngine>(),
            Ok(SearchEngine::Unidirectional)
        );
        assert!("sideways".parse::<SearchEngine>().is_err());
        assert_eq!(SearchEngine::Unidirectional.to_string(), "unidirectional");
    }

    #[test]
    fn select_search_matches_engine() {
        for engine in [SearchEngine::Unidirectional, SearchEngine::Bidirectional] {
            assert_eq!(select_search(engine).engine(), engine);
        }
    }

    #[test]
    fn path_result_counts_nodes() {
        let result = PathResult::from_path(vec![4, 7, 9], 12);
        assert!(result.is_found());
        assert_eq!(result.node_count, 3);
        assert!(!PathResult::no_path().is_found());
        assert!(PathResult::trivial().is_found());
    }
}
