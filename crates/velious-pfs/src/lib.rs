//! PFS archive reader for legacy 3D game assets.
//!
//! PFS archives (`.s3d`, `.pfs`) pack a game's zone geometry, textures, and
//! models into one file:
//!
//! - A 12-byte header with the `PFS ` signature and the directory offset
//! - A directory of `(checksum, offset, size)` slots
//! - A zlib-compressed filename table, held by the slot whose checksum is
//!   [`format::FILENAME_TABLE_CHECKSUM`], naming every other slot in order
//!
//! Opening an archive parses those three structures; payloads are read on
//! demand by absolute offset from a memory mapping.
//!
//! # Example
//!
//! ```no_run
//! use velious_pfs::PfsArchive;
//!
//! let archive = PfsArchive::open("befallen.s3d")?;
//!
//! for entry in archive.iter() {
//!     println!("{}: {} bytes", entry.name_lossy(), entry.size());
//! }
//!
//! let data = archive.read_entry("befallen.wld")?;
//! # Ok::<(), velious_pfs::Error>(())
//! ```

mod archive;
mod decompress;
mod directory;
mod entry;
mod error;
mod filenames;
mod header;
pub mod format;

pub use archive::PfsArchive;
pub use decompress::{inflate_block, BlockHeader};
pub use directory::{read_directory, Directory, DirectoryEntry};
pub use entry::{assemble, ChecksumMismatch, EntryTable, PfsEntry};
pub use error::{Error, Result};
pub use filenames::{decode_filenames, parse_filename_table};
pub use header::{read_header, ArchiveHeader};
