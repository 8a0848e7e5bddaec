//! Binary persistence for landmark tables.
//!
//! # Serialization Format
//!
//! ```text
//! Block (repeated twice, identical contents):
//!   - Node count: u64 LE
//!   - Per node:
//!       - Landmark count: u64 LE
//!       - Distances: landmark count x i32 LE (-1 = unreachable)
//!
//! Sidecar (<cache>.sha256):
//!   - Hex SHA-256 of the graph the table was computed from
//! ```
//!
//! The block is written twice for compatibility with readers that expect
//! separate "to" and "from" tables; on an undirected graph they are equal.
//! Every load failure is reported as [`Error::LandmarkCacheLoad`] and callers
//! treat it as a cache miss.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::Graph;

use super::LandmarkTable;

const U64_SIZE: usize = 8;
const I32_SIZE: usize = 4;

/// Path of the checksum sidecar stored next to a cache file.
///
/// For example, `landmarks.bin` -> `landmarks.bin.sha256`.
pub fn checksum_path(cache_path: &Path) -> PathBuf {
    let mut path = cache_path.as_os_str().to_owned();
    path.push(".sha256");
    PathBuf::from(path)
}

/// Write `table` to `path`, plus the graph checksum sidecar.
pub fn save(table: &LandmarkTable, graph: &Graph, path: &Path) -> Result<()> {
    info!(
        path = %path.display(),
        nodes = table.node_count(),
        landmarks = table.landmark_count(),
        "saving landmark cache"
    );

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for _ in 0..2 {
        write_block(&mut writer, table.rows())?;
    }
    writer.flush()?;

    fs::write(checksum_path(path), hex::encode(graph.content_hash()))?;

    debug!(path = %path.display(), "landmark cache saved");
    Ok(())
}

fn write_block<W: Write>(writer: &mut W, rows: &[Vec<i32>]) -> Result<()> {
    writer.write_all(&(rows.len() as u64).to_le_bytes())?;
    for row in rows {
        writer.write_all(&(row.len() as u64).to_le_bytes())?;
        for distance in row {
            writer.write_all(&distance.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Load a landmark table and check it belongs to `graph`.
pub fn load(path: &Path, graph: &Graph) -> Result<LandmarkTable> {
    debug!(path = %path.display(), "loading landmark cache");

    let fail = |message: String| Error::LandmarkCacheLoad {
        path: path.to_path_buf(),
        message,
    };

    let stored_hash = fs::read_to_string(checksum_path(path))
        .map_err(|e| fail(format!("failed to read checksum sidecar: {e}")))?;
    if stored_hash.trim() != hex::encode(graph.content_hash()) {
        return Err(fail("checksum does not match the loaded graph".to_string()));
    }

    let bytes = fs::read(path).map_err(|e| fail(format!("failed to read file: {e}")))?;
    let mut reader = ByteReader::new(&bytes);

    let to = read_block(&mut reader).map_err(|message| fail(format!("first table: {message}")))?;
    let from =
        read_block(&mut reader).map_err(|message| fail(format!("second table: {message}")))?;

    if to.len() != from.len() || to.iter().zip(&from).any(|(a, b)| a.len() != b.len()) {
        return Err(fail("tables differ in shape".to_string()));
    }

    let table = LandmarkTable::from_rows(to, Vec::new());
    if !table.matches(graph) {
        return Err(fail(format!(
            "table has {} rows for a graph of {} nodes",
            table.node_count(),
            graph.node_count()
        )));
    }

    info!(
        nodes = table.node_count(),
        landmarks = table.landmark_count(),
        "loaded landmark cache"
    );
    Ok(table)
}

/// Attempt to load a cache, returning `None` when it is absent or unusable.
pub fn try_load(path: &Path, graph: &Graph) -> Option<LandmarkTable> {
    if !path.exists() {
        debug!(path = %path.display(), "no landmark cache present");
        return None;
    }

    match load(path, graph) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to load landmark cache, will recompute"
            );
            None
        }
    }
}

fn read_block(reader: &mut ByteReader<'_>) -> std::result::Result<Vec<Vec<i32>>, String> {
    let node_count = reader.read_len(U64_SIZE)?;
    let mut rows = Vec::with_capacity(node_count);
    for node in 0..node_count {
        let width = reader
            .read_len(I32_SIZE)
            .map_err(|e| format!("row {node}: {e}"))?;
        let mut row = Vec::with_capacity(width);
        for _ in 0..width {
            row.push(reader.read_i32()?);
        }
        rows.push(row);
    }
    Ok(rows)
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn take<const N: usize>(&mut self) -> std::result::Result<[u8; N], String> {
        if self.remaining() < N {
            return Err(format!("unexpected end of file at byte {}", self.position));
        }
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.bytes[self.position..self.position + N]);
        self.position += N;
        Ok(buf)
    }

    fn read_i32(&mut self) -> std::result::Result<i32, String> {
        self.take::<I32_SIZE>().map(i32::from_le_bytes)
    }

    /// Read a u64 element count and reject counts whose elements of
    /// `element_size` bytes could not fit in the rest of the file.
    fn read_len(&mut self, element_size: usize) -> std::result::Result<usize, String> {
        let count = u64::from_le_bytes(self.take::<U64_SIZE>()?);
        let count = usize::try_from(count).map_err(|_| format!("count {count} too large"))?;
        if count.saturating_mul(element_size) > self.remaining() {
            return Err(format!("count {count} exceeds remaining file size"));
        }
        Ok(count)
    }
}
