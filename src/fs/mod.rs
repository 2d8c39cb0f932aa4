pub mod boot_sector;
pub mod cluster_io;
pub mod directory;
pub mod error;
pub mod fat_constants;
pub mod fat_table;
pub mod fs;
pub mod mock_store;
pub mod store;

pub use boot_sector::Geometry;
pub use directory::{Attributes, DirectoryEntry, FatDateTime, RootDirectory};
pub use error::{FormatError, FsError};
pub use fat_table::FatTable;
pub use fs::Volume;
pub use mock_store::MockStore;
pub use store::{ByteStore, FileStore};
