use std::fmt;

use bitflags::bitflags;

use crate::fs::boot_sector::Geometry;
use crate::fs::error::FsError;
use crate::fs::fat_constants::{DELETED_MARKER, DIR_ENTRY_SIZE};
use crate::fs::store::ByteStore;

bitflags! {
    /// Directory entry attribute byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attributes: u8 {
        const READ_ONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const VOLUME_ID = 0x08;
        const DIRECTORY = 0x10;
        const ARCHIVE = 0x20;
    }
}

/// Packed FAT date/time, decoded to civil components.
///
/// Seconds have 2-second resolution on disk. Decoding clamps out-of-range
/// components (month/day to 1, hour/minute/second to 0) instead of failing,
/// so a damaged entry always yields something displayable and the codec
/// round-trips deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl FatDateTime {
    pub fn decode(date: u16, time: u16) -> Self {
        let year = 1980 + ((date >> 9) & 0x7F);
        let mut month = ((date >> 5) & 0x0F) as u8;
        let mut day = (date & 0x1F) as u8;
        let mut hour = ((time >> 11) & 0x1F) as u8;
        let mut minute = ((time >> 5) & 0x3F) as u8;
        let mut second = ((time & 0x1F) * 2) as u8;
        if !(1..=12).contains(&month) {
            month = 1;
        }
        if day == 0 {
            day = 1;
        }
        if hour >= 24 {
            hour = 0;
        }
        if minute >= 60 {
            minute = 0;
        }
        if second >= 60 {
            second = 0;
        }
        FatDateTime { year, month, day, hour, minute, second }
    }

    pub fn encode(&self) -> (u16, u16) {
        let date = ((self.year.saturating_sub(1980) & 0x7F) << 9)
            | ((self.month as u16 & 0x0F) << 5)
            | (self.day as u16 & 0x1F);
        let time = ((self.hour as u16 & 0x1F) << 11)
            | ((self.minute as u16 & 0x3F) << 5)
            | (self.second as u16 / 2);
        (date, time)
    }

    /// Current local wall-clock time.
    pub fn now() -> Self {
        use chrono::{Datelike, Local, Timelike};
        let now = Local::now().naive_local();
        FatDateTime {
            year: now.year().clamp(1980, 2107) as u16,
            month: now.month() as u8,
            day: now.day() as u8,
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            second: now.second().min(59) as u8,
        }
    }
}

impl fmt::Display for FatDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Pack a file name into the fixed 11-byte on-disk form: upper-cased and
/// space-padded, the 8-byte base directly followed by the 3-byte extension
/// (no dot). Names longer than 11 characters are rejected.
pub fn pack_name(name: &str) -> Result<[u8; 11], FsError> {
    if name.len() > 11 {
        return Err(FsError::NameTooLong);
    }
    let mut out = [b' '; 11];
    for (i, b) in name.bytes().enumerate() {
        out[i] = b.to_ascii_uppercase();
    }
    Ok(out)
}

/// One 32-byte root directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: [u8; 8],
    pub ext: [u8; 3],
    pub attributes: Attributes,
    pub created: FatDateTime,
    pub modified: FatDateTime,
    pub start_cluster: u16,
    pub file_size: u32,
}

impl DirectoryEntry {
    /// Fresh entry for a newly created file.
    pub fn new(name11: [u8; 11], start_cluster: u16, file_size: u32, stamp: FatDateTime) -> Self {
        let mut name = [0u8; 8];
        name.copy_from_slice(&name11[0..8]);
        let mut ext = [0u8; 3];
        ext.copy_from_slice(&name11[8..11]);
        DirectoryEntry {
            name,
            ext,
            attributes: Attributes::ARCHIVE,
            created: stamp,
            modified: stamp,
            start_cluster,
            file_size,
        }
    }

    /// Decode a raw 32-byte slot.
    pub fn decode(raw: &[u8; 32]) -> Self {
        let mut name = [0u8; 8];
        name.copy_from_slice(&raw[0..8]);
        let mut ext = [0u8; 3];
        ext.copy_from_slice(&raw[8..11]);
        let creation_time = u16::from_le_bytes([raw[14], raw[15]]);
        let creation_date = u16::from_le_bytes([raw[16], raw[17]]);
        let modified_time = u16::from_le_bytes([raw[22], raw[23]]);
        let modified_date = u16::from_le_bytes([raw[24], raw[25]]);
        DirectoryEntry {
            name,
            ext,
            attributes: Attributes::from_bits_retain(raw[11]),
            created: FatDateTime::decode(creation_date, creation_time),
            modified: FatDateTime::decode(modified_date, modified_time),
            start_cluster: u16::from_le_bytes([raw[26], raw[27]]),
            file_size: u32::from_le_bytes([raw[28], raw[29], raw[30], raw[31]]),
        }
    }

    /// Serialize to the on-disk layout. Reserved bytes stay zero.
    pub fn encode(&self) -> [u8; 32] {
        let mut raw = [0u8; 32];
        raw[0..8].copy_from_slice(&self.name);
        raw[8..11].copy_from_slice(&self.ext);
        raw[11] = self.attributes.bits();
        let (creation_date, creation_time) = self.created.encode();
        raw[14..16].copy_from_slice(&creation_time.to_le_bytes());
        raw[16..18].copy_from_slice(&creation_date.to_le_bytes());
        let (modified_date, modified_time) = self.modified.encode();
        raw[22..24].copy_from_slice(&modified_time.to_le_bytes());
        raw[24..26].copy_from_slice(&modified_date.to_le_bytes());
        raw[26..28].copy_from_slice(&self.start_cluster.to_le_bytes());
        raw[28..32].copy_from_slice(&self.file_size.to_le_bytes());
        raw
    }

    /// The packed 11-byte name as stored on disk.
    pub fn name11(&self) -> [u8; 11] {
        let mut out = [0u8; 11];
        out[0..8].copy_from_slice(&self.name);
        out[8..11].copy_from_slice(&self.ext);
        out
    }

    /// Human form: base name, dot, extension, trailing pad stripped.
    pub fn display_name(&self) -> String {
        let base = std::str::from_utf8(&self.name).unwrap_or("").trim_end_matches(' ');
        let ext = std::str::from_utf8(&self.ext).unwrap_or("").trim_end_matches(' ');
        if ext.is_empty() {
            String::from(base)
        } else {
            format!("{}.{}", base, ext)
        }
    }
}

/// The fixed array of 32-byte entries between the FAT(s) and the data region.
pub struct RootDirectory {
    offset: u64,
    max_entries: usize,
}

impl RootDirectory {
    pub fn new(geometry: &Geometry) -> Self {
        RootDirectory {
            offset: geometry.root_dir_offset(),
            max_entries: geometry.max_root_entries as usize,
        }
    }

    fn read_raw<S: ByteStore>(&self, store: &mut S, index: usize) -> Result<[u8; 32], FsError> {
        let mut raw = [0u8; 32];
        store.read_at(self.offset + (index * DIR_ENTRY_SIZE) as u64, &mut raw)?;
        Ok(raw)
    }

    fn write_raw<S: ByteStore>(
        &self,
        store: &mut S,
        index: usize,
        raw: &[u8; 32],
    ) -> Result<(), FsError> {
        store.write_at(self.offset + (index * DIR_ENTRY_SIZE) as u64, raw)?;
        Ok(())
    }

    /// Decode every in-use entry: stops at the 0x00 terminator, skips
    /// deleted slots.
    pub fn load<S: ByteStore>(&self, store: &mut S) -> Result<Vec<DirectoryEntry>, FsError> {
        let mut out = Vec::new();
        for index in 0..self.max_entries {
            let raw = self.read_raw(store, index)?;
            if raw[0] == 0x00 {
                break;
            }
            if raw[0] == DELETED_MARKER {
                continue;
            }
            out.push(DirectoryEntry::decode(&raw));
        }
        Ok(out)
    }

    /// Index and record of the first live entry matching the packed name.
    pub fn find<S: ByteStore>(
        &self,
        store: &mut S,
        name11: &[u8; 11],
    ) -> Result<Option<(usize, DirectoryEntry)>, FsError> {
        for index in 0..self.max_entries {
            let raw = self.read_raw(store, index)?;
            if raw[0] == 0x00 {
                break;
            }
            if raw[0] == DELETED_MARKER {
                continue;
            }
            if raw[0..11] == name11[..] {
                return Ok(Some((index, DirectoryEntry::decode(&raw))));
            }
        }
        Ok(None)
    }

    /// Index of the first slot available for a new entry: never written, or
    /// previously deleted.
    pub fn find_free_slot<S: ByteStore>(&self, store: &mut S) -> Result<Option<usize>, FsError> {
        for index in 0..self.max_entries {
            let raw = self.read_raw(store, index)?;
            if raw[0] == 0x00 || raw[0] == DELETED_MARKER {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Serialize `entry` into the given slot, exactly 32 bytes.
    pub fn write_entry<S: ByteStore>(
        &self,
        store: &mut S,
        index: usize,
        entry: &DirectoryEntry,
    ) -> Result<(), FsError> {
        self.write_raw(store, index, &entry.encode())
    }

    /// Mark the slot deleted in place; the rest of the record is left as-is.
    pub fn mark_deleted<S: ByteStore>(&self, store: &mut S, index: usize) -> Result<(), FsError> {
        let mut raw = self.read_raw(store, index)?;
        raw[0] = DELETED_MARKER;
        self.write_raw(store, index, &raw)
    }

    /// Overwrite an entry's name bytes, leaving every other field alone.
    pub fn rename<S: ByteStore>(
        &self,
        store: &mut S,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), FsError> {
        let packed_new = pack_name(new_name)?;
        let packed_old = pack_name(old_name)?;
        match self.find(store, &packed_old)? {
            Some((index, _)) => {
                let mut raw = self.read_raw(store, index)?;
                raw[0..11].copy_from_slice(&packed_new);
                self.write_raw(store, index, &raw)
            }
            None => Err(FsError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stamp() -> FatDateTime {
        FatDateTime {
            year: 2024,
            month: 6,
            day: 15,
            hour: 13,
            minute: 37,
            second: 42,
        }
    }

    #[test]
    fn entry_codec_round_trips() {
        let entry = DirectoryEntry {
            name: *b"FOO     ",
            ext: *b"TXT",
            attributes: Attributes::ARCHIVE | Attributes::READ_ONLY,
            created: sample_stamp(),
            modified: sample_stamp(),
            start_cluster: 7,
            file_size: 1234,
        };
        assert_eq!(DirectoryEntry::decode(&entry.encode()), entry);
    }

    #[test]
    fn datetime_decodes_epoch() {
        // year bits zero, month 1, day 1, midnight
        let dt = FatDateTime::decode(0x0021, 0x0000);
        assert_eq!(
            dt,
            FatDateTime { year: 1980, month: 1, day: 1, hour: 0, minute: 0, second: 0 }
        );
    }

    #[test]
    fn datetime_clamps_invalid_components() {
        // month 0 and day 0
        let dt = FatDateTime::decode(0x0000, 0x0000);
        assert_eq!(dt.month, 1);
        assert_eq!(dt.day, 1);
        // month 15
        let dt = FatDateTime::decode(15 << 5 | 1, 0x0000);
        assert_eq!(dt.month, 1);
        // hour 25, minute 61, stored seconds 30 (= 60 once doubled)
        let dt = FatDateTime::decode(0x0021, (25 << 11) | (61 << 5) | 30);
        assert_eq!((dt.hour, dt.minute, dt.second), (0, 0, 0));
    }

    #[test]
    fn pack_name_pads_and_uppercases() {
        assert_eq!(&pack_name("foo").unwrap(), b"FOO        ");
        assert_eq!(&pack_name("FOO     TXT").unwrap(), b"FOO     TXT");
        assert!(matches!(pack_name("TOOLONGNAME1"), Err(FsError::NameTooLong)));
    }

    #[test]
    fn attributes_preserve_unknown_bits() {
        let mut raw = [0u8; 32];
        raw[0] = b'A';
        raw[11] = 0xC1; // read-only plus two reserved high bits
        let entry = DirectoryEntry::decode(&raw);
        assert!(entry.attributes.contains(Attributes::READ_ONLY));
        assert_eq!(entry.encode()[11], 0xC1);
    }
}
