//! fatvol — a minimal FAT12/16 volume driver for raw disk images.
//!
//! The driver operates on any flat byte store (see [`ByteStore`]), derives
//! the volume layout from the boot parameter block, and exposes file-level
//! operations over 8.3 short-name entries in the fixed root directory:
//! listing, content reads via cluster-chain traversal, creation with cluster
//! allocation, deletion with chain deallocation, and in-place rename.
//!
//! Out of scope: subdirectories, long filenames, FAT32, and any write
//! atomicity across the FAT and the directory — `create_file` and
//! `remove_file` mutate the two regions independently, and an interruption
//! between the two flushes leaves the volume inconsistent.

pub mod fs;

pub use fs::boot_sector::Geometry;
pub use fs::directory::{Attributes, DirectoryEntry, FatDateTime};
pub use fs::error::{FormatError, FsError};
pub use fs::fs::Volume;
pub use fs::mock_store::MockStore;
pub use fs::store::{ByteStore, FileStore};
