use std::collections::HashMap;
use std::mem::size_of;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

/// External node identifier as it appears in the source edge list.
pub type NodeId = u32;

/// One undirected, weighted edge as read from the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeRecord {
    pub a: NodeId,
    pub b: NodeId,
    pub cost: u32,
}

impl EdgeRecord {
    /// Edge between `a` and `b` with traversal cost `cost`.
    pub fn new(a: NodeId, b: NodeId, cost: u32) -> Self {
        Self { a, b, cost }
    }
}

/// Directed half of an edge stored in the CSR arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Dense index of the neighbour.
    pub target: u32,
    pub weight: i32,
}

/// Estimated heap usage of a [`Graph`], in bytes per component.
///
/// Figures are `capacity * size_of` of each backing collection; allocator
/// overhead is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryFootprint {
    /// External id to dense index map, including one control byte per slot.
    pub id_map: usize,
    /// Dense index to external id table.
    pub id_table: usize,
    /// CSR row offsets.
    pub offsets: usize,
    /// CSR edge array, both directions of every edge.
    pub edges: usize,
}

impl MemoryFootprint {
    /// Sum of every component.
    pub fn total(&self) -> usize {
        self.id_map + self.id_table + self.offsets + self.edges
    }
}

/// Immutable adjacency in compressed sparse row form.
///
/// External ids are remapped to dense indices `0..node_count` in first-sighting
/// order. Each undirected edge is stored twice, once per direction, so the
/// neighbours of index `i` are `edges[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    id_to_index: HashMap<NodeId, u32>,
    index_to_id: Vec<NodeId>,
    offsets: Vec<usize>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Build the CSR layout from validated edge records.
    ///
    /// An empty input produces an empty graph.
    pub fn from_edges(records: &[EdgeRecord]) -> Self {
        let mut id_to_index: HashMap<NodeId, u32> = HashMap::new();
        let mut index_to_id: Vec<NodeId> = Vec::new();

        for record in records {
            for id in [record.a, record.b] {
                id_to_index.entry(id).or_insert_with(|| {
                    index_to_id.push(id);
                    (index_to_id.len() - 1) as u32
                });
            }
        }

        let node_count = index_to_id.len();
        let mut degree = vec![0usize; node_count];
        for record in records {
            degree[id_to_index[&record.a] as usize] += 1;
            degree[id_to_index[&record.b] as usize] += 1;
        }

        let mut offsets = Vec::with_capacity(node_count + 1);
        offsets.push(0);
        for count in &degree {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + count);
        }

        let mut cursor = offsets[..node_count].to_vec();
        let mut edges = vec![Edge { target: 0, weight: 0 }; offsets[node_count]];
        for record in records {
            let a = id_to_index[&record.a];
            let b = id_to_index[&record.b];
            let weight = i32::try_from(record.cost).unwrap_or(i32::MAX);

            edges[cursor[a as usize]] = Edge { target: b, weight };
            cursor[a as usize] += 1;
            edges[cursor[b as usize]] = Edge { target: a, weight };
            cursor[b as usize] += 1;
        }

        info!(nodes = node_count, edges = records.len(), "built CSR graph");

        Self {
            id_to_index,
            index_to_id,
            offsets,
            edges,
        }
    }

    /// Number of distinct nodes.
    pub fn node_count(&self) -> usize {
        self.index_to_id.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Whether the graph was built from an empty edge list.
    pub fn is_empty(&self) -> bool {
        self.index_to_id.is_empty()
    }

    /// Dense index for an external id, if the node exists.
    pub fn index_of(&self, id: NodeId) -> Option<u32> {
        self.id_to_index.get(&id).copied()
    }

    /// External id for a dense index.
    ///
    /// Panics if `index` is out of range; indices only come from this graph.
    pub fn id_of(&self, index: u32) -> NodeId {
        self.index_to_id[index as usize]
    }

    /// Return the neighbours of a dense index.
    pub fn neighbours(&self, index: u32) -> &[Edge] {
        let index = index as usize;
        if index >= self.node_count() {
            return &[];
        }
        &self.edges[self.offsets[index]..self.offsets[index + 1]]
    }

    /// Mean number of neighbours per node.
    pub fn average_degree(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.edges.len() as f64 / self.node_count() as f64
    }

    /// Estimated heap usage of each component.
    pub fn memory_footprint(&self) -> MemoryFootprint {
        MemoryFootprint {
            id_map: self.id_to_index.capacity() * (size_of::<(NodeId, u32)>() + 1),
            id_table: self.index_to_id.capacity() * size_of::<NodeId>(),
            offsets: self.offsets.capacity() * size_of::<usize>(),
            edges: self.edges.capacity() * size_of::<Edge>(),
        }
    }

    /// SHA-256 over the id table and CSR arrays, used to key the landmark cache.
    pub fn content_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.node_count() as u64).to_le_bytes());
        for id in &self.index_to_id {
            hasher.update(id.to_le_bytes());
        }
        for offset in &self.offsets {
            hasher.update((*offset as u64).to_le_bytes());
        }
        for edge in &self.edges {
            hasher.update(edge.target.to_le_bytes());
            hasher.update(edge.weight.to_le_bytes());
        }
        hasher.finalize().into()
    }
}
