//! Bidirectional A* with one worker thread per frontier.
//!
//! The forward worker searches from start towards goal, the backward worker
//! from goal towards start. Each owns its open list and its half of the search
//! buffers; they communicate only through the shared distance arrays and two
//! atomics:
//!
//! - `best`: the cheapest meeting found so far, packed as `(cost << 32) | node`
//!   so cost and node are tightened together with one `fetch_min`.
//! - `done`: set by whichever worker first proves that no cheaper meeting can
//!   exist (or runs out of time); the other worker stops at its next pop.
//!
//! A worker stops when its open list is empty or when its cheapest entry has
//! a priority at least the best meeting cost. With an admissible heuristic and
//! `weight >= 1` this bounds the result by `weight` times the optimum.

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use tracing::trace;

use super::buffers::{Parent, SearchBuffers, SideBuffers};
use super::{
    priority, DeadlineCheck, PathSearch, QueueEntry, SearchContext, SearchEngine, SearchOutcome,
    SearchState,
};

const NO_MEETING: u64 = u64::MAX;

/// Concurrent bidirectional A*.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidirectionalSearch;

struct Meeting {
    best: AtomicU64,
    done: AtomicBool,
}

impl Meeting {
    fn new() -> Self {
        Self {
            best: AtomicU64::new(NO_MEETING),
            done: AtomicBool::new(false),
        }
    }

    fn offer(&self, cost: i32, node: u32) {
        let packed = (u64::from(cost as u32) << 32) | u64::from(node);
        self.best.fetch_min(packed, Ordering::Relaxed);
    }

    /// Best meeting cost, `i64::MAX` before any meeting.
    fn cost(&self) -> i64 {
        match self.best.load(Ordering::Relaxed) {
            NO_MEETING => i64::MAX,
            packed => i64::from((packed >> 32) as u32),
        }
    }

    fn node(&self) -> Option<u32> {
        match self.best.load(Ordering::Relaxed) {
            NO_MEETING => None,
            packed => Some(packed as u32),
        }
    }

    fn finish(&self) {
        self.done.store(true, Ordering::Relaxed);
    }

    fn is_done(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }
}

/// Why a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerExit {
    Exhausted,
    Bounded,
    Stopped,
    TimedOut,
}

struct Frontier<'a> {
    side: SideBuffers<'a>,
    open: BinaryHeap<QueueEntry>,
    target: u32,
}

impl<'a> Frontier<'a> {
    /// Label `origin` with distance zero and queue it.
    ///
    /// Both frontiers are seeded before either worker starts, so a worker that
    /// reaches the opposite origin always sees it labeled.
    fn seed(
        mut side: SideBuffers<'a>,
        origin: u32,
        target: u32,
        context: &SearchContext<'_>,
    ) -> Self {
        let heuristic = context.heuristic;
        side.distances.set(origin, side.epoch, 0);
        let h = side.heuristic_or_insert(origin, || heuristic.estimate(origin, target));
        let mut open = BinaryHeap::new();
        open.push(QueueEntry::new(origin, 0, priority(0, h, context.weight)));
        Self { side, open, target }
    }

    fn run(self, context: &SearchContext<'_>, meeting: &Meeting) -> (WorkerExit, usize) {
        let Frontier {
            mut side,
            mut open,
            target,
        } = self;
        let epoch = side.epoch;
        let heuristic = context.heuristic;
        let mut deadline = DeadlineCheck::new(&context.limits);
        let mut expanded = 0usize;

        let exit = loop {
            if meeting.is_done() {
                break WorkerExit::Stopped;
            }
            if deadline.expired() {
                meeting.finish();
                break WorkerExit::TimedOut;
            }
            let Some(entry) = open.pop() else {
                meeting.finish();
                break WorkerExit::Exhausted;
            };
            if side.distance(entry.node).is_some_and(|g| entry.g > g) {
                continue;
            }
            let bound = meeting.cost();
            if entry.f >= bound {
                meeting.finish();
                break WorkerExit::Bounded;
            }
            expanded += 1;

            for edge in context.graph.neighbours(entry.node) {
                let next = edge.target;
                let new_g = entry.g.saturating_add(edge.weight);
                let h = side.heuristic_or_insert(next, || heuristic.estimate(next, target));
                // No route through `next` via this edge can beat the current meeting.
                if i64::from(new_g) + i64::from(h) >= bound {
                    continue;
                }

                let g = match side.distance(next) {
                    Some(existing) if existing <= new_g => existing,
                    _ => {
                        side.distances.set(next, epoch, new_g);
                        side.parents.set(
                            next,
                            epoch,
                            Parent {
                                node: entry.node,
                                cost: edge.weight,
                            },
                        );
                        open.push(QueueEntry::new(
                            next,
                            new_g,
                            priority(new_g, h, context.weight),
                        ));
                        new_g
                    }
                };

                if let Some(remaining) = side.opposite_distance(next) {
                    meeting.offer(g.saturating_add(remaining), next);
                }
            }
        };

        (exit, expanded)
    }
}

impl PathSearch for BidirectionalSearch {
    fn engine(&self) -> SearchEngine {
        SearchEngine::Bidirectional
    }

    fn search(
        &self,
        context: &SearchContext<'_>,
        buffers: &mut SearchBuffers,
        start: u32,
        goal: u32,
    ) -> SearchOutcome {
        buffers.begin_search();
        let meeting = Meeting::new();

        let ((forward_exit, forward_expanded), (backward_exit, backward_expanded)) = {
            let (forward, backward) = buffers.sides();
            let forward = Frontier::seed(forward, start, goal, context);
            let backward = Frontier::seed(backward, goal, start, context);
            let meeting = &meeting;

            thread::scope(|scope| {
                let backward = scope.spawn(move || backward.run(context, meeting));
                let forward = forward.run(context, meeting);
                // A panic in the backward worker is a bug; surface it here.
                let backward = backward
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
                (forward, backward)
            })
        };

        let expanded = forward_expanded + backward_expanded;
        let timed_out =
            forward_exit == WorkerExit::TimedOut || backward_exit == WorkerExit::TimedOut;
        trace!(
            ?forward_exit,
            ?backward_exit,
            expanded,
            "bidirectional search finished"
        );

        let Some(meet) = meeting.node() else {
            let state = if timed_out {
                SearchState::TimedOut
            } else {
                SearchState::Exhausted
            };
            return SearchOutcome::not_found(state, expanded);
        };

        match reconstruct(buffers, start, goal, meet) {
            Some((path, cost)) => SearchOutcome {
                state: if timed_out {
                    SearchState::TimedOut
                } else {
                    SearchState::Found
                },
                path,
                cost,
                expanded,
            },
            None => SearchOutcome::not_found(SearchState::Exhausted, expanded),
        }
    }
}

/// Walk forward parents from `meet` to `start` and backward parents from
/// `meet` to `goal`, summing the recorded edge costs.
fn reconstruct(
    buffers: &SearchBuffers,
    start: u32,
    goal: u32,
    meet: u32,
) -> Option<(Vec<u32>, i32)> {
    let limit = buffers.node_count();
    let mut cost = 0i32;

    let mut path = vec![meet];
    let mut current = meet;
    while current != start {
        let parent = buffers.forward_parent(current)?;
        cost = cost.saturating_add(parent.cost);
        current = parent.node;
        path.push(current);
        if path.len() > limit {
            return None;
        }
    }
    path.reverse();

    let mut current = meet;
    while current != goal {
        let parent = buffers.backward_parent(current)?;
        cost = cost.saturating_add(parent.cost);
        current = parent.node;
        path.push(current);
        if path.len() > limit {
            return None;
        }
    }

    Some((path, cost))
}
