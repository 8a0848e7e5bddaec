//! Reusable, epoch-versioned scratch space for searches.
//!
//! Every slot carries the epoch of the search that wrote it. Starting a new
//! search only bumps the epoch, so a slot written by an earlier search reads as
//! unset without touching the arrays. When the epoch counter wraps, the tags are
//! cleared once and counting restarts at 1.
//!
//! The two distance arrays are read by the opposite side of a bidirectional
//! search while the owning side writes them. Each of their slots packs the
//! epoch and the value into a single `AtomicU64`, so a reader observes either a
//! whole current entry or nothing. Stores and cross-side loads are `SeqCst`:
//! when both sides label the same node, at least one of them sees the other.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

use tracing::debug;

/// Predecessor link recorded during a search: the previous node and the cost of
/// the edge used to reach the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parent {
    pub node: u32,
    pub cost: i32,
}

/// Values tagged with the epoch that wrote them. Owned by one search side.
#[derive(Debug)]
pub struct Versioned<T> {
    values: Vec<T>,
    versions: Vec<u32>,
}

impl<T: Copy + Default> Versioned<T> {
    fn new(len: usize) -> Self {
        Self {
            values: vec![T::default(); len],
            versions: vec![0; len],
        }
    }

    /// Value written in `epoch`, if any.
    #[inline]
    pub fn get(&self, index: u32, epoch: u32) -> Option<T> {
        let index = index as usize;
        (self.versions[index] == epoch).then(|| self.values[index])
    }

    /// Store `value` and tag the slot with `epoch`.
    #[inline]
    pub fn set(&mut self, index: u32, epoch: u32, value: T) {
        let index = index as usize;
        self.values[index] = value;
        self.versions[index] = epoch;
    }

    fn clear_versions(&mut self) {
        self.versions.fill(0);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Distance array shared between the two sides of a bidirectional search.
#[derive(Debug)]
pub struct EpochDistances {
    slots: Vec<AtomicU64>,
}

impl EpochDistances {
    fn new(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    #[inline]
    fn pack(epoch: u32, value: i32) -> u64 {
        (u64::from(epoch) << 32) | u64::from(value as u32)
    }

    #[inline]
    fn unpack(packed: u64, epoch: u32) -> Option<i32> {
        ((packed >> 32) as u32 == epoch).then_some(packed as u32 as i32)
    }

    /// Distance recorded in `epoch`, or `None` when the slot is unset.
    ///
    /// Only valid from the writing thread or after the writer was joined.
    #[inline]
    pub fn get(&self, index: u32, epoch: u32) -> Option<i32> {
        Self::unpack(self.slots[index as usize].load(Ordering::Relaxed), epoch)
    }

    /// Like [`Self::get`], for reads racing with the writing thread.
    #[inline]
    pub fn get_shared(&self, index: u32, epoch: u32) -> Option<i32> {
        Self::unpack(self.slots[index as usize].load(Ordering::SeqCst), epoch)
    }

    /// Publish a distance for `epoch`.
    #[inline]
    pub fn set(&self, index: u32, epoch: u32, value: i32) {
        self.slots[index as usize].store(Self::pack(epoch, value), Ordering::SeqCst);
    }

    fn clear_versions(&mut self) {
        for slot in &mut self.slots {
            *slot.get_mut() = 0;
        }
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

/// One side's view of the buffers during a search.
pub struct SideBuffers<'a> {
    pub epoch: u32,
    pub distances: &'a EpochDistances,
    pub opposite: &'a EpochDistances,
    pub parents: &'a mut Versioned<Parent>,
    pub heuristic: &'a mut Versioned<i32>,
}

impl SideBuffers<'_> {
    /// Tentative distance from this side's origin.
    #[inline]
    pub fn distance(&self, index: u32) -> Option<i32> {
        self.distances.get(index, self.epoch)
    }

    /// Distance recorded by the other side, read while it may still be writing.
    #[inline]
    pub fn opposite_distance(&self, index: u32) -> Option<i32> {
        self.opposite.get_shared(index, self.epoch)
    }

    /// Cached heuristic value, computing and storing it on first use.
    #[inline]
    pub fn heuristic_or_insert(&mut self, index: u32, compute: impl FnOnce() -> i32) -> i32 {
        match self.heuristic.get(index, self.epoch) {
            Some(value) => value,
            None => {
                let value = compute();
                self.heuristic.set(index, self.epoch, value);
                value
            }
        }
    }
}

/// Scratch arrays for one in-flight query (one "lane").
#[derive(Debug)]
pub struct SearchBuffers {
    epoch: u32,
    dist_forward: EpochDistances,
    dist_backward: EpochDistances,
    parent_forward: Versioned<Parent>,
    parent_backward: Versioned<Parent>,
    h_forward: Versioned<i32>,
    h_backward: Versioned<i32>,
    closed: Versioned<bool>,
}

impl SearchBuffers {
    /// Allocate buffers for a graph of `node_count` nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            epoch: 0,
            dist_forward: EpochDistances::new(node_count),
            dist_backward: EpochDistances::new(node_count),
            parent_forward: Versioned::new(node_count),
            parent_backward: Versioned::new(node_count),
            h_forward: Versioned::new(node_count),
            h_backward: Versioned::new(node_count),
            closed: Versioned::new(node_count),
        }
    }

    /// Number of node slots per array.
    pub fn node_count(&self) -> usize {
        self.dist_forward.len()
    }

    /// Epoch of the current (or last) search.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Invalidate every slot and return the epoch for the new search.
    pub fn begin_search(&mut self) -> u32 {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            self.clear_versions();
            self.epoch = 1;
        }
        self.epoch
    }

    /// Jump the epoch counter, used to exercise wrap-around handling.
    #[cfg(test)]
    pub(crate) fn set_epoch(&mut self, epoch: u32) {
        self.epoch = epoch;
    }

    fn clear_versions(&mut self) {
        debug!(nodes = self.node_count(), "search epoch wrapped, clearing tags");
        self.dist_forward.clear_versions();
        self.dist_backward.clear_versions();
        self.parent_forward.clear_versions();
        self.parent_backward.clear_versions();
        self.h_forward.clear_versions();
        self.h_backward.clear_versions();
        self.closed.clear_versions();
    }

    /// Forward and backward views for a bidirectional search.
    pub fn sides(&mut self) -> (SideBuffers<'_>, SideBuffers<'_>) {
        let forward = SideBuffers {
            epoch: self.epoch,
            distances: &self.dist_forward,
            opposite: &self.dist_backward,
            parents: &mut self.parent_forward,
            heuristic: &mut self.h_forward,
        };
        let backward = SideBuffers {
            epoch: self.epoch,
            distances: &self.dist_backward,
            opposite: &self.dist_forward,
            parents: &mut self.parent_backward,
            heuristic: &mut self.h_backward,
        };
        (forward, backward)
    }

    /// Forward view plus the closed set for a unidirectional search.
    pub fn forward_with_closed(&mut self) -> (SideBuffers<'_>, &mut Versioned<bool>) {
        let forward = SideBuffers {
            epoch: self.epoch,
            distances: &self.dist_forward,
            opposite: &self.dist_backward,
            parents: &mut self.parent_forward,
            heuristic: &mut self.h_forward,
        };
        (forward, &mut self.closed)
    }

    /// Forward predecessor of `index` in the current epoch.
    pub fn forward_parent(&self, index: u32) -> Option<Parent> {
        self.parent_forward.get(index, self.epoch)
    }

    /// Backward successor of `index` in the current epoch.
    pub fn backward_parent(&self, index: u32) -> Option<Parent> {
        self.parent_backward.get(index, self.epoch)
    }

    /// Forward distance of `index` in the current epoch.
    pub fn forward_distance(&self, index: u32) -> Option<i32> {
        self.dist_forward.get(index, self.epoch)
    }

    /// Backward distance of `index` in the current epoch.
    pub fn backward_distance(&self, index: u32) -> Option<i32> {
        self.dist_backward.get(index, self.epoch)
    }

    #[cfg(test)]
    pub(crate) fn closed_len(&self) -> usize {
        self.closed.len()
    }

    #[cfg(test)]
    pub(crate) fn heuristic_len(&self) -> usize {
        self.h_forward.len() + self.h_backward.len()
    }
}

/// Fixed set of [`SearchBuffers`] lanes shared by concurrent queries.
#[derive(Debug)]
pub struct BufferPool {
    node_count: usize,
    lanes: Mutex<Vec<SearchBuffers>>,
    available: Condvar,
    size: usize,
}

impl BufferPool {
    /// Allocate `lanes` buffer sets for a graph of `node_count` nodes.
    pub fn new(node_count: usize, lanes: usize) -> Self {
        let size = lanes.max(1);
        debug!(nodes = node_count, lanes = size, "allocating search buffers");
        Self {
            node_count,
            lanes: Mutex::new((0..size).map(|_| SearchBuffers::new(node_count)).collect()),
            available: Condvar::new(),
            size,
        }
    }

    /// Node count each lane was sized for.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Total number of lanes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Lanes currently idle.
    pub fn idle(&self) -> usize {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Take a lane, blocking until one is returned if all are in use.
    pub fn checkout(&self) -> PooledBuffers<'_> {
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(buffers) = lanes.pop() {
                return PooledBuffers {
                    pool: self,
                    buffers,
                };
            }
            lanes = self
                .available
                .wait(lanes)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn give_back(&self, buffers: SearchBuffers) {
        self.lanes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(buffers);
        self.available.notify_one();
    }
}

/// A lane checked out of a [`BufferPool`]; returned to the pool on drop.
pub struct PooledBuffers<'a> {
    pool: &'a BufferPool,
    buffers: SearchBuffers,
}

impl Deref for PooledBuffers<'_> {
    type Target = SearchBuffers;

    fn deref(&self) -> &SearchBuffers {
        &self.buffers
    }
}

impl DerefMut for PooledBuffers<'_> {
    fn deref_mut(&mut self) -> &mut SearchBuffers {
        &mut self.buffers
    }
}

impl Drop for PooledBuffers<'_> {
    fn drop(&mut self) {
        // Zero-length vectors do not allocate.
        let buffers = std::mem::replace(&mut self.buffers, SearchBuffers::new(0));
        self.pool.give_back(buffers);
    }
}
