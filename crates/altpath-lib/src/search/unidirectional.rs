use std::collections::BinaryHeap;

use tracing::trace;

use super::buffers::{Parent, SearchBuffers};
use super::{
    priority, DeadlineCheck, PathSearch, QueueEntry, SearchContext, SearchEngine, SearchOutcome,
    SearchState,
};

/// Weighted A* with a closed set, stopping when the goal is popped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnidirectionalSearch;

impl PathSearch for UnidirectionalSearch {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Unidirectional
    }

    fn search(
        &self,
        context: &SearchContext<'_>,
        buffers: &mut SearchBuffers,
        start: u32,
        goal: u32,
    ) -> SearchOutcome {
        let epoch = buffers.begin_search();
        let graph = context.graph;
        let heuristic = context.heuristic;
        let mut deadline = DeadlineCheck::new(&context.limits);
        let mut expanded = 0usize;

        let state = {
            let (mut side, closed) = buffers.forward_with_closed();
            let mut open = BinaryHeap::new();

            side.distances.set(start, epoch, 0);
            let h = side.heuristic_or_insert(start, || heuristic.estimate(start, goal));
            open.push(QueueEntry::new(start, 0, priority(0, h, context.weight)));

            loop {
                if deadline.expired() {
                    break SearchState::TimedOut;
                }
                let Some(entry) = open.pop() else {
                    break SearchState::Exhausted;
                };
                if closed.get(entry.node, epoch).unwrap_or(false) {
                    continue;
                }
                if entry.node == goal {
                    break SearchState::Found;
                }
                closed.set(entry.node, epoch, true);
                expanded += 1;

                for edge in graph.neighbours(entry.node) {
                    let next = edge.target;
                    if closed.get(next, epoch).unwrap_or(false) {
                        continue;
                    }
                    let new_g = entry.g.saturating_add(edge.weight);
                    if side.distance(next).is_some_and(|g| g <= new_g) {
                        continue;
                    }
                    side.distances.set(next, epoch, new_g);
                    side.parents.set(
                        next,
                        epoch,
                        Parent {
                            node: entry.node,
                            cost: edge.weight,
                        },
                    );
                    let h = side.heuristic_or_insert(next, || heuristic.estimate(next, goal));
                    open.push(QueueEntry::new(next, new_g, priority(new_g, h, context.weight)));
                }
            }
        };

        trace!(?state, expanded, "unidirectional search finished");

        if state != SearchState::Found {
            return SearchOutcome::not_found(state, expanded);
        }

        let mut path = vec![goal];
        let mut cost = 0i32;
        let mut current = goal;
        while current != start {
            let Some(parent) = buffers.forward_parent(current) else {
                return SearchOutcome::not_found(SearchState::Exhausted, expanded);
            };
            cost = cost.saturating_add(parent.cost);
            current = parent.node;
            path.push(current);
        }
        path.reverse();

        SearchOutcome {
            state,
            path,
            cost,
            expanded,
        }
    }
}
