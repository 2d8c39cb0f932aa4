//! Reads and writes of file content, addressed by cluster chain.
//!
//! The data region starts right after the root directory; cluster 2 is its
//! first allocation unit. Callers hand in an already-loaded `FatTable` for
//! chain walks and are responsible for linking chains before writing.

use crate::fs::boot_sector::Geometry;
use crate::fs::error::FsError;
use crate::fs::fat_table::FatTable;
use crate::fs::store::ByteStore;

/// Byte offset of the first data cluster (cluster 2).
pub fn data_region_offset(geometry: &Geometry) -> u64 {
    let (first, count) = geometry.root_dir_start();
    (first + count) * geometry.bytes_per_block as u64
}

/// Byte offset of `cluster` within the data region.
pub fn cluster_offset(geometry: &Geometry, cluster: u16) -> u64 {
    data_region_offset(geometry) + (cluster as u64 - 2) * geometry.bytes_per_cluster() as u64
}

/// Collect `total_size` bytes by walking the chain from `head`.
///
/// Reads `min(remaining, bytes_per_cluster)` from each cluster in link
/// order. A chain that reaches end-of-chain early is `TruncatedChain`; a
/// chain longer than the table itself is `CorruptChain`.
pub fn read_chain<S: ByteStore>(
    store: &mut S,
    geometry: &Geometry,
    fat: &FatTable,
    head: u16,
    total_size: usize,
) -> Result<Vec<u8>, FsError> {
    if total_size > 0 && head < 2 {
        return Err(FsError::TruncatedChain);
    }
    // not preallocated to total_size: a corrupt entry can claim gigabytes
    let bytes_per_cluster = geometry.bytes_per_cluster();
    let mut out = Vec::new();
    let mut cluster = head;
    let mut visited = 0usize;
    while out.len() < total_size {
        if visited >= fat.entry_count() {
            return Err(FsError::CorruptChain);
        }
        let remaining = total_size - out.len();
        let take = remaining.min(bytes_per_cluster);
        let mut buf = vec![0u8; take];
        store.read_at(cluster_offset(geometry, cluster), &mut buf)?;
        out.extend_from_slice(&buf);
        visited += 1;
        if out.len() < total_size {
            cluster = match fat.next_cluster(cluster) {
                Some(next) => next,
                None => return Err(FsError::TruncatedChain),
            };
        }
    }
    Ok(out)
}

/// Write `content` across `clusters` in order, one cluster-sized piece each;
/// the last piece may be short. The chain must already be linked in the FAT.
pub fn write_chain<S: ByteStore>(
    store: &mut S,
    geometry: &Geometry,
    clusters: &[u16],
    content: &[u8],
) -> Result<(), FsError> {
    let bytes_per_cluster = geometry.bytes_per_cluster();
    for (i, &cluster) in clusters.iter().enumerate() {
        let start = i * bytes_per_cluster;
        let end = (start + bytes_per_cluster).min(content.len());
        if start >= end {
            break;
        }
        store.write_at(cluster_offset(geometry, cluster), &content[start..end])?;
    }
    Ok(())
}
