//! On-disk PFS structures.
//!
//! Every record is little-endian and unaligned. Fields use zerocopy's
//! byte-order-aware integers so records can be read straight out of a
//! memory-mapped file on any host.

use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Archive signature, space padded.
pub const MAGIC: [u8; 4] = *b"PFS ";

/// The only supported format constant (`0x0002_0000`).
pub const FORMAT_VERSION: u32 = 131_072;

/// Checksum marking the directory entry that holds the filename table.
pub const FILENAME_TABLE_CHECKSUM: u32 = 0x6158_0AC9;

/// Size of [`RawHeader`] in bytes.
pub const HEADER_SIZE: usize = std::mem::size_of::<RawHeader>();

/// Size of one [`RawDirectoryEntry`] in bytes.
pub const DIRECTORY_ENTRY_SIZE: usize = std::mem::size_of::<RawDirectoryEntry>();

/// Size of [`RawBlockHeader`] in bytes.
pub const BLOCK_HEADER_SIZE: usize = std::mem::size_of::<RawBlockHeader>();

/// Hard cap on the output of a single inflate.
pub const MAX_INFLATED_LEN: u64 = 256 * 1024 * 1024;

/// File header at offset 0.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawHeader {
    /// Absolute offset of the directory
    pub directory_offset: U32,
    /// Signature, expected to be [`MAGIC`]
    pub magic: [u8; 4],
    /// Format constant, expected to be [`FORMAT_VERSION`]
    pub format_version: U32,
}

/// One directory slot. Follows the `u32` entry count at the directory offset.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawDirectoryEntry {
    /// Checksum of the entry's name
    pub checksum: U32,
    /// Absolute offset of the payload
    pub payload_offset: U32,
    /// Payload length in bytes
    pub payload_size: U32,
}

/// Header preceding each compressed block.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawBlockHeader {
    /// Length of the zlib stream that follows
    pub compressed_length: U32,
    /// Expected length once inflated
    pub inflated_length: U32,
}
