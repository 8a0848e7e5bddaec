//! ALT landmark preprocessing.
//!
//! Landmarks are chosen with the farthest-node strategy: the first landmark is
//! dense index 0, and every following landmark is the node whose distance to
//! the nearest already-chosen landmark is largest. Nodes that no landmark has
//! reached yet count as infinitely far, so each disconnected component receives
//! a landmark before any component receives a second one.
//!
//! The resulting table stores, per node, the shortest-path distance to every
//! landmark, with `-1` marking an unreachable landmark.

pub mod cache;

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::mem::size_of;

use tracing::{debug, info, warn};

use crate::graph::Graph;

/// Marker for a node that cannot reach a landmark.
pub const UNREACHABLE: i32 = -1;

/// Per-node distances to every selected landmark.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandmarkTable {
    distances: Vec<Vec<i32>>,
    landmarks: Vec<u32>,
}

impl LandmarkTable {
    /// Assemble a table from rows indexed `[node][landmark]`.
    ///
    /// `landmarks` lists the dense indices the columns were computed from and
    /// may be empty when that information is not available.
    pub fn from_rows(distances: Vec<Vec<i32>>, landmarks: Vec<u32>) -> Self {
        Self {
            distances,
            landmarks,
        }
    }

    /// Select up to `requested` landmarks and compute their distance columns.
    ///
    /// Fewer landmarks are returned when the graph has fewer nodes than
    /// requested; callers read the achieved count from [`Self::landmark_count`].
    pub fn compute(graph: &Graph, requested: usize) -> Self {
        let node_count = graph.node_count();
        if node_count == 0 || requested == 0 {
            return Self::from_rows(vec![Vec::new(); node_count], Vec::new());
        }

        info!(requested, nodes = node_count, "selecting landmarks");

        // i64::MAX marks "not reached yet"; -1 marks an already chosen landmark.
        let mut nearest = vec![i64::MAX; node_count];
        let mut columns: Vec<Vec<i32>> = Vec::with_capacity(requested.min(node_count));
        let mut landmarks: Vec<u32> = Vec::with_capacity(requested.min(node_count));

        let mut next = Some(0u32);
        while let Some(landmark) = next {
            debug!(
                landmark = graph.id_of(landmark),
                position = landmarks.len() + 1,
                requested,
                "processing landmark"
            );

            let column = dijkstra(graph, landmark);
            for (slot, &distance) in nearest.iter_mut().zip(&column) {
                if distance >= 0 && *slot >= 0 && i64::from(distance) < *slot {
                    *slot = i64::from(distance);
                }
            }
            nearest[landmark as usize] = -1;
            columns.push(column);
            landmarks.push(landmark);

            if landmarks.len() == requested {
                break;
            }
            next = farthest_candidate(&nearest);
        }

        if landmarks.len() < requested {
            warn!(
                requested,
                achieved = landmarks.len(),
                "requested landmark count exceeds available nodes"
            );
        }

        let distances = (0..node_count)
            .map(|node| columns.iter().map(|column| column[node]).collect())
            .collect();

        info!(landmarks = landmarks.len(), "landmark preprocessing complete");
        Self::from_rows(distances, landmarks)
    }

    /// Estimated heap usage in bytes: row headers, distance cells, and the
    /// landmark index list.
    pub fn memory_footprint(&self) -> usize {
        self.distances.capacity() * size_of::<Vec<i32>>()
            + self
                .distances
                .iter()
                .map(|row| row.capacity() * size_of::<i32>())
                .sum::<usize>()
            + self.landmarks.capacity() * size_of::<u32>()
    }

    /// Expected [`Self::memory_footprint`] of a table with `landmarks`
    /// columns over `node_count` nodes, before computing it.
    pub fn estimated_footprint(node_count: usize, landmarks: usize) -> usize {
        let landmarks = landmarks.min(node_count);
        node_count * (size_of::<Vec<i32>>() + landmarks * size_of::<i32>())
            + landmarks * size_of::<u32>()
    }

    /// Number of landmark columns per node.
    pub fn landmark_count(&self) -> usize {
        self.distances.first().map_or(0, Vec::len)
    }

    /// Number of rows, one per graph node.
    pub fn node_count(&self) -> usize {
        self.distances.len()
    }

    /// Distances from the node at `index` to every landmark.
    pub fn row(&self, index: u32) -> &[i32] {
        self.distances
            .get(index as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All rows, indexed `[node][landmark]`.
    pub fn rows(&self) -> &[Vec<i32>] {
        &self.distances
    }

    /// Dense indices of the chosen landmarks, empty when loaded from a cache.
    pub fn landmarks(&self) -> &[u32] {
        &self.landmarks
    }

    /// Whether this table has one row per node of `graph` and rows of equal length.
    pub fn matches(&self, graph: &Graph) -> bool {
        let width = self.landmark_count();
        self.distances.len() == graph.node_count()
            && self.distances.iter().all(|row| row.len() == width)
    }
}

fn farthest_candidate(nearest: &[i64]) -> Option<u32> {
    let mut best: Option<(u32, i64)> = None;
    for (index, &distance) in nearest.iter().enumerate() {
        if distance < 0 {
            continue;
        }
        if best.is_none_or(|(_, current)| distance > current) {
            best = Some((index as u32, distance));
        }
    }
    best.map(|(index, _)| index)
}

/// Single-source Dijkstra over the CSR graph.
///
/// Returns one distance per dense index, [`UNREACHABLE`] where no path exists.
/// A source outside the graph yields an all-unreachable vector.
pub fn dijkstra(graph: &Graph, source: u32) -> Vec<i32> {
    let node_count = graph.node_count();
    let mut distances = vec![UNREACHABLE; node_count];
    if source as usize >= node_count {
        return distances;
    }

    let mut queue = BinaryHeap::new();
    distances[source as usize] = 0;
    queue.push(Reverse((0i32, source)));

    while let Some(Reverse((distance, node))) = queue.pop() {
        if distance > distances[node as usize] {
            continue;
        }
        for edge in graph.neighbours(node) {
            let next = distance.saturating_add(edge.weight);
            let slot = &mut distances[edge.target as usize];
            if *slot == UNREACHABLE || next < *slot {
                *slot = next;
                queue.push(Reverse((next, edge.target)));
            }
        }
    }

    distances
}
