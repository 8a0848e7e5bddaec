//! Graph preparation and the query entry point.
//!
//! [`build`] turns an edge list into a [`Graph`] plus an optional
//! [`LandmarkTable`]. [`PathFinder`] owns both, together with a pool of search
//! buffers, and answers queries from any number of threads.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::graph::{EdgeRecord, Graph, NodeId};
use crate::heuristic::Heuristic;
use crate::landmarks::{cache, LandmarkTable};
use crate::search::{
    select_search, BufferPool, PathResult, SearchBuffers, SearchContext, SearchEngine,
    SearchLimits, SearchState,
};

/// Build the graph and, when enabled, its landmark table.
///
/// When fewer landmarks than requested could be placed, `config.landmark_count`
/// is lowered to the achieved count so callers can persist the corrected value.
pub fn build(
    edges: &[EdgeRecord],
    config: &mut EngineConfig,
) -> Result<(Graph, Option<LandmarkTable>)> {
    config.validate()?;
    let graph = Graph::from_edges(edges);
    let landmarks = config
        .use_landmarks
        .then(|| prepare_landmarks(&graph, config));
    log_footprint(&graph, landmarks.as_ref());
    Ok((graph, landmarks))
}

fn log_footprint(graph: &Graph, landmarks: Option<&LandmarkTable>) {
    let footprint = graph.memory_footprint();
    let landmark_bytes = landmarks.map_or(0, LandmarkTable::memory_footprint);
    info!(
        id_map_bytes = footprint.id_map,
        id_table_bytes = footprint.id_table,
        offsets_bytes = footprint.offsets,
        edges_bytes = footprint.edges,
        landmark_bytes,
        total_bytes = footprint.total() + landmark_bytes,
        "estimated memory footprint"
    );
}

fn prepare_landmarks(graph: &Graph, config: &mut EngineConfig) -> LandmarkTable {
    let requested = config.landmark_count as usize;
    let expected = requested.min(graph.node_count());

    if let Some(path) = config.landmark_cache_path.as_deref() {
        if let Some(table) = cache::try_load(path, graph) {
            if table.landmark_count() == expected {
                return table;
            }
            info!(
                cached = table.landmark_count(),
                expected, "landmark cache has a different landmark count, recomputing"
            );
        }
    }

    let table = LandmarkTable::compute(graph, requested);
    if !graph.is_empty() && table.landmark_count() < requested {
        config.landmark_count = table.landmark_count() as u32;
    }

    if config.persist_landmarks {
        if let Some(path) = config.landmark_cache_path.as_deref() {
            if let Err(e) = cache::save(&table, graph, path) {
                warn!(path = %path.display(), error = %e, "failed to save landmark cache");
            }
        }
    }

    table
}

/// Shared query service over one immutable graph.
#[derive(Debug)]
pub struct PathFinder {
    graph: Graph,
    landmarks: Option<LandmarkTable>,
    config: EngineConfig,
    pool: BufferPool,
}

impl PathFinder {
    /// Take ownership of a prepared graph and allocate `config.search_lanes`
    /// buffer sets.
    pub fn new(graph: Graph, landmarks: Option<LandmarkTable>, config: EngineConfig) -> Self {
        let landmarks = landmarks.filter(|table| {
            let usable = table.matches(&graph);
            if !usable {
                warn!(
                    rows = table.node_count(),
                    nodes = graph.node_count(),
                    "landmark table does not match graph, ignoring it"
                );
            }
            usable
        });
        let pool = BufferPool::new(graph.node_count(), config.search_lanes);
        Self {
            graph,
            landmarks,
            config,
            pool,
        }
    }

    /// Read, build, and wrap in one step.
    pub fn from_edges(edges: &[EdgeRecord], mut config: EngineConfig) -> Result<Self> {
        let (graph, landmarks) = build(edges, &mut config)?;
        Ok(Self::new(graph, landmarks, config))
    }

    /// The loaded graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Landmark table, absent when landmarks are disabled or the graph is empty.
    pub fn landmarks(&self) -> Option<&LandmarkTable> {
        self.landmarks.as_ref()
    }

    /// Effective configuration, after build-time adjustments.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of queries that can run at the same time without waiting.
    pub fn lanes(&self) -> usize {
        self.pool.size()
    }

    /// Apply the configured per-query weight policy.
    pub fn resolve_weight(&self, requested: Option<f64>) -> Result<f64> {
        self.config.resolve_weight(requested)
    }

    /// Shortest path from `start` to `end`.
    ///
    /// `weight` inflates the heuristic; the returned cost is at most `weight`
    /// times the optimum. Values below `1.0` are treated as `1.0`. Unknown ids
    /// and unreachable pairs yield [`PathResult::no_path`].
    pub fn query(
        &self,
        start: NodeId,
        end: NodeId,
        weight: f64,
        engine: SearchEngine,
    ) -> PathResult {
        self.query_with_limits(start, end, weight, engine, SearchLimits::default())
    }

    /// Query with the configured default weight and engine.
    pub fn query_default(&self, start: NodeId, end: NodeId) -> PathResult {
        self.query(
            start,
            end,
            self.config.default_weight,
            self.config.search_engine,
        )
    }

    /// Query with an optional deadline.
    pub fn query_with_limits(
        &self,
        start: NodeId,
        end: NodeId,
        weight: f64,
        engine: SearchEngine,
        limits: SearchLimits,
    ) -> PathResult {
        if start == end {
            return PathResult::trivial();
        }
        let mut buffers = self.pool.checkout();
        self.run(&mut buffers, start, end, weight, engine, limits)
    }

    /// Query using a caller-owned buffer set instead of the pool.
    ///
    /// # Panics
    ///
    /// Panics if `buffers` was sized for a different graph.
    pub fn query_in(
        &self,
        buffers: &mut SearchBuffers,
        start: NodeId,
        end: NodeId,
        weight: f64,
        engine: SearchEngine,
    ) -> PathResult {
        assert_eq!(
            buffers.node_count(),
            self.graph.node_count(),
            "search buffers sized for a different graph"
        );
        if start == end {
            return PathResult::trivial();
        }
        self.run(buffers, start, end, weight, engine, SearchLimits::default())
    }

    fn run(
        &self,
        buffers: &mut SearchBuffers,
        start: NodeId,
        end: NodeId,
        weight: f64,
        engine: SearchEngine,
        limits: SearchLimits,
    ) -> PathResult {
        let (Some(from), Some(to)) = (self.graph.index_of(start), self.graph.index_of(end)) else {
            debug!(start, end, "query endpoint not in graph");
            return PathResult::no_path();
        };

        let weight = if weight >= 1.0 { weight } else { 1.0 };
        let context = SearchContext {
            graph: &self.graph,
            heuristic: Heuristic::select(&self.graph, self.landmarks.as_ref()),
            weight,
            limits,
        };

        let started = Instant::now();
        let outcome = select_search(engine).search(&context, buffers, from, to);
        debug!(
            start,
            end,
            %engine,
            weight,
            state = ?outcome.state,
            cost = outcome.cost,
            expanded = outcome.expanded,
            elapsed_us = started.elapsed().as_micros() as u64,
            "query finished"
        );
        if outcome.state == SearchState::TimedOut {
            warn!(start, end, %engine, "query hit its deadline");
        }

        if outcome.path.is_empty() {
            return PathResult::no_path();
        }
        let path = outcome
            .path
            .iter()
            .map(|&index| self.graph.id_of(index))
            .collect();
        PathResult::from_path(path, outcome.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_edges() -> Vec<EdgeRecord> {
        vec![EdgeRecord::new(1, 2, 5), EdgeRecord::new(2, 3, 7)]
    }

    #[test]
    fn build_without_landmarks() {
        let mut config = EngineConfig {
            use_landmarks: false,
            ..EngineConfig::default()
        };
        let (graph, landmarks) = build(&line_edges(), &mut config).expect("build");
        assert_eq!(graph.node_count(), 3);
        assert!(landmarks.is_none());
    }

    #[test]
    fn build_lowers_landmark_count() {
        let mut config = EngineConfig {
            landmark_count: 50,
            ..EngineConfig::default()
        };
        let (_, landmarks) = build(&line_edges(), &mut config).expect("build");
        assert_eq!(landmarks.expect("table").landmark_count(), 3);
        assert_eq!(config.landmark_count, 3);
    }

    #[test]
    fn build_rejects_invalid_config() {
        let mut config = EngineConfig {
            default_weight: 0.0,
            ..EngineConfig::default()
        };
        assert!(build(&line_edges(), &mut config).is_err());
    }

    #[test]
    fn trivial_and_unknown_queries() {
        let finder = PathFinder::from_edges(&line_edges(), EngineConfig::default()).expect("build");
        for engine in [SearchEngine::Unidirectional, SearchEngine::Bidirectional] {
            assert_eq!(finder.query(2, 2, 1.0, engine), PathResult::trivial());
            assert_eq!(finder.query(99, 99, 1.0, engine), PathResult::trivial());
            assert_eq!(finder.query(1, 99, 1.0, engine), PathResult::no_path());
            assert_eq!(finder.query(99, 1, 1.0, engine), PathResult::no_path());
        }
    }

    #[test]
    fn sub_unit_weight_is_clamped() {
        let finder = PathFinder::from_edges(&line_edges(), EngineConfig::default()).expect("build");
        let result = finder.query(1, 3, 0.25, SearchEngine::Bidirectional);
        assert_eq!(result.total_cost, 12);
    }

    #[test]
    #[should_panic(expected = "different graph")]
    fn foreign_buffers_panic() {
        let finder = PathFinder::from_edges(&line_edges(), EngineConfig::default()).expect("build");
        let mut buffers = SearchBuffers::new(10);
        finder.query_in(&mut buffers, 1, 3, 1.0, SearchEngine::Unidirectional);
    }

    #[test]
    fn mismatched_landmarks_are_dropped() {
        let graph = Graph::from_edges(&line_edges());
        let table = LandmarkTable::from_rows(vec![vec![0]; 7], Vec::new());
        let finder = PathFinder::new(graph, Some(table), EngineConfig::default());
        assert!(finder.landmarks().is_none());
        assert_eq!(finder.query_default(1, 3).total_cost, 12);
    }
}
