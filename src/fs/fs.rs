use log::{debug, warn};

use crate::fs::boot_sector::Geometry;
use crate::fs::cluster_io;
use crate::fs::directory::{pack_name, DirectoryEntry, FatDateTime, RootDirectory};
use crate::fs::error::FsError;
use crate::fs::fat_constants::{
    BLOCKS_PER_CLUSTER_DEFAULT, BLOCKS_PER_FAT_DEFAULT, BYTES_PER_BLOCK_DEFAULT,
    MAX_ROOT_ENTRIES_DEFAULT, NUM_FATS_DEFAULT, RESERVED_BLOCKS_DEFAULT,
};
use crate::fs::fat_table::FatTable;
use crate::fs::store::ByteStore;

/// An open FAT12/16 volume: the backing store plus its parsed geometry.
///
/// All file operations live here. The root directory is re-read from the
/// store on every call rather than cached, so the store stays the single
/// source of truth across mutations.
///
/// There is no transaction spanning the FAT and the directory: `create_file`
/// and `remove_file` flush the FAT and write the directory as two
/// independent store mutations, and an interruption between the two leaves
/// the volume inconsistent.
pub struct Volume<'a, S: ByteStore> {
    store: &'a mut S,
    geometry: Geometry,
}

impl<'a, S: ByteStore> Volume<'a, S> {
    /// Parse the boot sector and wrap the store.
    pub fn mount(store: &'a mut S) -> Result<Self, FsError> {
        let mut buf = [0u8; 512];
        store.read_at(0, &mut buf)?;
        let geometry = match Geometry::parse(&buf) {
            Ok(g) => g,
            Err(e) => {
                warn!("mount: boot sector rejected: {}", e);
                return Err(e);
            }
        };
        debug!("mount: {:?}", geometry);
        Ok(Volume { store, geometry })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn root_dir(&self) -> RootDirectory {
        RootDirectory::new(&self.geometry)
    }

    /// Decode the in-use root directory entries.
    pub fn list_root(&mut self) -> Result<Vec<DirectoryEntry>, FsError> {
        let dir = self.root_dir();
        dir.load(self.store)
    }

    /// Read a file's content by walking its cluster chain.
    pub fn read_file(&mut self, name: &str) -> Result<Vec<u8>, FsError> {
        let packed = pack_name(name)?;
        let dir = self.root_dir();
        let (_, entry) = dir.find(self.store, &packed)?.ok_or(FsError::NotFound)?;
        let fat = FatTable::load(self.store, &self.geometry)?;
        cluster_io::read_chain(
            self.store,
            &self.geometry,
            &fat,
            entry.start_cluster,
            entry.file_size as usize,
        )
    }

    /// Store `content` as a new file named `name`.
    ///
    /// Allocates first-fit clusters, links and flushes the FAT, writes the
    /// content, then claims a directory slot. A zero-length file gets no
    /// clusters and records start cluster 0. Duplicate names are not
    /// checked; the first matching entry wins on lookup.
    pub fn create_file(&mut self, name: &str, content: &[u8]) -> Result<DirectoryEntry, FsError> {
        let packed = pack_name(name)?;
        let bytes_per_cluster = self.geometry.bytes_per_cluster();
        let clusters_needed = (content.len() + bytes_per_cluster - 1) / bytes_per_cluster;

        let mut fat = FatTable::load(self.store, &self.geometry)?;
        let clusters = fat.find_free(clusters_needed)?;
        fat.link_chain(&clusters);
        fat.flush(self.store)?;
        cluster_io::write_chain(self.store, &self.geometry, &clusters, content)?;

        let dir = self.root_dir();
        let slot = dir.find_free_slot(self.store)?.ok_or(FsError::DirectoryFull)?;
        let entry = DirectoryEntry::new(
            packed,
            clusters.first().copied().unwrap_or(0),
            content.len() as u32,
            FatDateTime::now(),
        );
        dir.write_entry(self.store, slot, &entry)?;
        debug!(
            "create: {} -> {} cluster(s), slot {}",
            entry.display_name(),
            clusters.len(),
            slot
        );
        Ok(entry)
    }

    /// Delete `name`: mark the directory slot, then free and flush the chain.
    ///
    /// An entry that is already marked deleted does not match and yields
    /// `NotFound`.
    pub fn remove_file(&mut self, name: &str) -> Result<(), FsError> {
        let packed = pack_name(name)?;
        let dir = self.root_dir();
        let (index, entry) = dir.find(self.store, &packed)?.ok_or(FsError::NotFound)?;
        dir.mark_deleted(self.store, index)?;
        let mut fat = FatTable::load(self.store, &self.geometry)?;
        fat.free_chain(entry.start_cluster);
        fat.flush(self.store)?;
        debug!("remove: {} freed chain at {}", entry.display_name(), entry.start_cluster);
        Ok(())
    }

    /// Rename in place; content and all fields other than the name are
    /// untouched.
    pub fn rename_file(&mut self, old_name: &str, new_name: &str) -> Result<(), FsError> {
        let dir = self.root_dir();
        dir.rename(self.store, old_name, new_name)
    }

    /// Write a blank volume onto the store with the driver's default
    /// geometry: 512-byte blocks, one block per cluster, one FAT of nine
    /// blocks, 224 root entries.
    pub fn format(store: &mut S, total_blocks: u16) -> Result<(), FsError> {
        let zero = [0u8; 512];
        let blocks = store.size()? / 512;
        for block in 0..blocks {
            store.write_at(block * 512, &zero)?;
        }

        let geometry = Geometry {
            bytes_per_block: BYTES_PER_BLOCK_DEFAULT,
            blocks_per_cluster: BLOCKS_PER_CLUSTER_DEFAULT,
            reserved_blocks: RESERVED_BLOCKS_DEFAULT,
            num_fats: NUM_FATS_DEFAULT,
            max_root_entries: MAX_ROOT_ENTRIES_DEFAULT,
            blocks_per_fat: BLOCKS_PER_FAT_DEFAULT,
        };
        let mut boot = [0u8; 512];
        geometry.serialize(total_blocks, &mut boot)?;
        store.write_at(0, &boot)?;
        debug!("format: {} blocks, {:?}", total_blocks, geometry);
        Ok(())
    }
}
