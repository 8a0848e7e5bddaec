//! Lower-bound estimates used to order the A* open lists.

use crate::graph::Graph;
use crate::landmarks::{LandmarkTable, UNREACHABLE};

/// Estimate of the remaining cost between two dense indices.
#[derive(Debug, Clone, Copy)]
pub enum Heuristic<'a> {
    /// Absolute difference of the external ids.
    ///
    /// This is only a lower bound for datasets whose ids are laid out so that
    /// numerically close nodes are close in cost; it exists for graphs where
    /// landmark preprocessing is disabled.
    Base(&'a Graph),
    /// ALT bound `max_L |d_L(goal) - d_L(node)|` from the triangle inequality.
    Landmark(&'a LandmarkTable),
}

impl<'a> Heuristic<'a> {
    /// Use the landmark bound when a non-empty table is available.
    pub fn select(graph: &'a Graph, landmarks: Option<&'a LandmarkTable>) -> Self {
        match landmarks {
            Some(table) if table.landmark_count() > 0 => Heuristic::Landmark(table),
            _ => Heuristic::Base(graph),
        }
    }

    /// Never negative; zero when `node == goal`.
    pub fn estimate(&self, node: u32, goal: u32) -> i32 {
        if node == goal {
            return 0;
        }
        match self {
            Heuristic::Base(graph) => {
                let diff = i64::from(graph.id_of(node)) - i64::from(graph.id_of(goal));
                i32::try_from(diff.abs()).unwrap_or(i32::MAX)
            }
            Heuristic::Landmark(table) => table
                .row(node)
                .iter()
                .zip(table.row(goal))
                .filter_map(|(&from, &to)| {
                    (from != UNREACHABLE && to != UNREACHABLE).then_some((to - from).abs())
                })
                .max()
                .unwrap_or(0),
        }
    }

    /// `true` when estimates come from a landmark table.
    pub fn is_landmark(&self) -> bool {
        matches!(self, Heuristic::Landmark(_))
    }
}
