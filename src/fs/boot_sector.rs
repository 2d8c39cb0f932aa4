use crate::fs::error::{FormatError, FsError};
use crate::fs::fat_constants::{BOOT_SIG_LEAD, BOOT_SIG_TRAIL, DIR_ENTRY_SIZE};

/// Volume parameters derived from the boot parameter block.
///
/// Parsed once per mount and immutable afterwards; every other component
/// takes its byte offsets from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub bytes_per_block: u16,
    pub blocks_per_cluster: u8,
    pub reserved_blocks: u16,
    pub num_fats: u8,
    pub max_root_entries: u16,
    pub blocks_per_fat: u16,
}

impl Geometry {
    /// Extract the BPB fields from a raw boot sector.
    pub fn parse(buf: &[u8]) -> Result<Self, FsError> {
        if buf.len() < 512 {
            return Err(FsError::Format(FormatError::TooShort));
        }

        let geometry = Geometry {
            bytes_per_block: u16::from_le_bytes([buf[11], buf[12]]),
            blocks_per_cluster: buf[13],
            reserved_blocks: u16::from_le_bytes([buf[14], buf[15]]),
            num_fats: buf[16],
            max_root_entries: u16::from_le_bytes([buf[17], buf[18]]),
            blocks_per_fat: u16::from_le_bytes([buf[22], buf[23]]),
        };
        if geometry.bytes_per_cluster() == 0 {
            return Err(FsError::Format(FormatError::ZeroClusterSize));
        }
        Ok(geometry)
    }

    pub fn bytes_per_cluster(&self) -> usize {
        self.bytes_per_block as usize * self.blocks_per_cluster as usize
    }

    /// First sector of the root directory and the number of sectors it spans.
    pub fn root_dir_start(&self) -> (u64, u64) {
        let first = self.reserved_blocks as u64 + self.num_fats as u64 * self.blocks_per_fat as u64;
        let bytes = self.max_root_entries as u64 * DIR_ENTRY_SIZE as u64;
        let count = (bytes + self.bytes_per_block as u64 - 1) / self.bytes_per_block as u64;
        (first, count)
    }

    /// Byte offset of the first FAT.
    pub fn fat_offset(&self) -> u64 {
        self.reserved_blocks as u64 * self.bytes_per_block as u64
    }

    /// Size of a single FAT in bytes.
    pub fn fat_len(&self) -> usize {
        self.blocks_per_fat as usize * self.bytes_per_block as usize
    }

    pub fn root_dir_offset(&self) -> u64 {
        let (first, _) = self.root_dir_start();
        first * self.bytes_per_block as u64
    }

    /// Re-encode the BPB into a boot sector buffer (used by `format`).
    pub fn serialize(&self, total_blocks: u16, buf: &mut [u8]) -> Result<(), FsError> {
        if buf.len() < 512 {
            return Err(FsError::Format(FormatError::TooShort));
        }
        buf[11..13].copy_from_slice(&self.bytes_per_block.to_le_bytes());
        buf[13] = self.blocks_per_cluster;
        buf[14..16].copy_from_slice(&self.reserved_blocks.to_le_bytes());
        buf[16] = self.num_fats;
        buf[17..19].copy_from_slice(&self.max_root_entries.to_le_bytes());
        buf[19..21].copy_from_slice(&total_blocks.to_le_bytes());
        buf[22..24].copy_from_slice(&self.blocks_per_fat.to_le_bytes());
        // boot sig
        buf[510] = BOOT_SIG_LEAD;
        buf[511] = BOOT_SIG_TRAIL;
        Ok(())
    }
}

// Unit tests for Geometry live in tests/fs_unit.rs.
