//! PFS directory: the flat table of entry descriptors.

use tracing::debug;
use velious_common::ByteReader;

use crate::format::{RawDirectoryEntry, DIRECTORY_ENTRY_SIZE, FILENAME_TABLE_CHECKSUM};
use crate::header::ArchiveHeader;
use crate::{Error, Result};

/// One directory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DirectoryEntry {
    /// Checksum of the entry's (not yet known) name.
    pub checksum: u32,
    /// Absolute offset of the payload.
    pub payload_offset: u32,
    /// Payload length in bytes.
    pub payload_size: u32,
}

impl DirectoryEntry {
    /// Whether this slot holds the filename table.
    #[inline]
    pub fn is_filename_table(&self) -> bool {
        self.checksum == FILENAME_TABLE_CHECKSUM
    }
}

impl From<RawDirectoryEntry> for DirectoryEntry {
    fn from(raw: RawDirectoryEntry) -> Self {
        Self {
            checksum: raw.checksum.get(),
            payload_offset: raw.payload_offset.get(),
            payload_size: raw.payload_size.get(),
        }
    }
}

/// The parsed directory, in on-disk order.
#[derive(Debug, Clone)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
    filename_table: usize,
}

impl Directory {
    /// All entries, the filename table included.
    #[inline]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Number of entries, the filename table included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a directory returned by [`read_directory`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the filename table entry within [`entries`](Self::entries).
    #[inline]
    pub fn filename_table_index(&self) -> usize {
        self.filename_table
    }

    /// The entry holding the compressed filename table.
    #[inline]
    pub fn filename_entry(&self) -> &DirectoryEntry {
        &self.entries[self.filename_table]
    }

    /// Every other entry, in directory order.
    pub fn file_entries(&self) -> impl Iterator<Item = &DirectoryEntry> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(index, _)| *index != self.filename_table)
            .map(|(_, entry)| entry)
    }

    /// Number of entries excluding the filename table.
    #[inline]
    pub fn file_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }
}

/// Read the directory at `header.directory_offset`.
///
/// Payload ranges are not checked against the archive size here; that only
/// happens when a payload is actually read.
pub fn read_directory(data: &[u8], header: &ArchiveHeader) -> Result<Directory> {
    let mut reader = ByteReader::at(data, header.directory_offset as usize);

    let count = reader.read_u32().map_err(Error::TruncatedDirectory)? as usize;

    // Check the whole table up front so a bogus count cannot drive the allocation.
    reader
        .ensure(count.saturating_mul(DIRECTORY_ENTRY_SIZE))
        .map_err(Error::TruncatedDirectory)?;

    let mut entries = Vec::with_capacity(count);
    let mut filename_table = None;
    let mut reserved = 0usize;

    for index in 0..count {
        let raw: RawDirectoryEntry = reader.read_struct().map_err(Error::TruncatedDirectory)?;
        let entry = DirectoryEntry::from(raw);

        if entry.is_filename_table() {
            reserved += 1;
            filename_table.get_or_insert(index);
        }
        entries.push(entry);
    }

    let filename_table = match (reserved, filename_table) {
        (1, Some(index)) => index,
        (0, _) => return Err(Error::FilenameTableNotFound),
        (count, _) => return Err(Error::AmbiguousFilenameTable { count }),
    };

    debug!(
        entries = entries.len(),
        filename_table,
        "read PFS directory"
    );

    Ok(Directory {
        entries,
        filename_table,
    })
}
