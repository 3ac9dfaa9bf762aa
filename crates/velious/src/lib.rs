//! Velious - legacy 3D game archive extraction library.
//!
//! This crate provides a unified interface to the Velious crates.
//!
//! # Crates
//!
//! - [`velious_common`] - Common utilities (bounds-checked binary reading)
//! - [`velious_pfs`] - PFS (`.s3d`) archive reading
//!
//! # Example
//!
//! ```no_run
//! use velious::prelude::*;
//!
//! let archive = PfsArchive::open("befallen.s3d")?;
//!
//! if let Some(entry) = archive.find("befallen.wld") {
//!     let data = archive.read(entry)?;
//!     println!("{}: {} bytes", entry.name_lossy(), data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use velious_common as common;
pub use velious_pfs as pfs;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use velious_common::ByteReader;
    pub use velious_pfs::{ArchiveHeader, DirectoryEntry, PfsArchive, PfsEntry};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
