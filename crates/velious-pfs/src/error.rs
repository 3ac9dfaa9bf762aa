//! Error types for the PFS crate.

use thiserror::Error;

/// Errors that can occur when working with PFS archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while opening or mapping the archive.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes than a full header.
    #[error("malformed header: expected {expected} bytes, got {actual}")]
    MalformedHeader { expected: usize, actual: usize },

    /// Invalid PFS signature.
    #[error("invalid PFS magic: expected 'PFS ', got {0:?}")]
    BadMagic([u8; 4]),

    /// Format constant other than the supported one.
    #[error("unsupported format version: {0:#010x}")]
    UnsupportedVersion(u32),

    /// The directory runs past the end of the archive.
    #[error("truncated directory: {0}")]
    TruncatedDirectory(#[source] velious_common::Error),

    /// No directory entry carries the filename table checksum.
    #[error("filename table entry not found")]
    FilenameTableNotFound,

    /// More than one directory entry carries the filename table checksum.
    #[error("ambiguous filename table: {count} entries carry the reserved checksum")]
    AmbiguousFilenameTable { count: usize },

    /// Compressed data could not be inflated.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// The filename table ends before all of its names.
    #[error("truncated filename table: {0}")]
    TruncatedFilenameTable(String),

    /// Decoded names and directory entries disagree in number.
    #[error("name count mismatch: {names} names for {entries} entries")]
    NameCountMismatch { names: usize, entries: usize },

    /// Entry not found.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// An entry's payload range exceeds the archive.
    #[error("truncated payload for {name}: {size} bytes at offset {offset}, only {available} available")]
    TruncatedPayload {
        name: String,
        offset: u64,
        size: u64,
        available: u64,
    },
}

/// Result type for PFS operations.
pub type Result<T> = std::result::Result<T, Error>;
