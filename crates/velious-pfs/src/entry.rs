//! Named archive entries and the assembled lookup table.

use std::borrow::Cow;
use std::hash::BuildHasherDefault;
use std::path::{Path, PathBuf};

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use tracing::debug;

use crate::directory::{Directory, DirectoryEntry};
use crate::{Error, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// An entry (file) within a PFS archive.
///
/// This carries the name and payload location, not the payload itself.
/// Use [`PfsArchive::read`](crate::PfsArchive::read) to get the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PfsEntry {
    /// Name exactly as stored in the filename table.
    name: Box<[u8]>,
    /// Checksum from the directory slot.
    checksum: u32,
    /// Absolute payload offset.
    offset: u32,
    /// Payload length in bytes.
    size: u32,
}

impl PfsEntry {
    pub(crate) fn new(name: Box<[u8]>, location: &DirectoryEntry) -> Self {
        Self {
            name,
            checksum: location.checksum,
            offset: location.payload_offset,
            size: location.payload_size,
        }
    }

    /// Raw name bytes.
    #[inline]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Name as text, with invalid UTF-8 replaced and any NUL terminator removed.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(trim_nul(&self.name))
    }

    /// Directory checksum.
    #[inline]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Absolute payload offset.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Payload length in bytes.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The directory slot this entry was bound to.
    pub fn location(&self) -> DirectoryEntry {
        DirectoryEntry {
            checksum: self.checksum,
            payload_offset: self.offset,
            payload_size: self.size,
        }
    }

    /// Get the file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        std::str::from_utf8(trim_nul(&self.name))
            .ok()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
    }

    /// Relative path for extraction.
    ///
    /// Both separator styles are split on, and empty, `.`, `..` and
    /// drive-qualified components are dropped, so the result always stays
    /// under whatever directory it is joined to.
    pub fn output_path(&self) -> PathBuf {
        self.name_lossy()
            .split(['/', '\\'])
            .filter(|part| !part.is_empty() && *part != "." && *part != ".." && !part.contains(':'))
            .collect()
    }

    /// Lenient name comparison: ASCII case-insensitive, separator-agnostic,
    /// ignoring a NUL terminator on either side.
    pub fn matches(&self, name: &[u8]) -> bool {
        let stored = trim_nul(&self.name);
        let wanted = trim_nul(name);

        stored.len() == wanted.len()
            && stored
                .iter()
                .zip(wanted)
                .all(|(&a, &b)| fold(a) == fold(b))
    }
}

/// Cut a name at its first NUL byte.
#[inline]
fn trim_nul(name: &[u8]) -> &[u8] {
    memchr::memchr(0, name).map_or(name, |end| &name[..end])
}

#[inline]
fn fold(byte: u8) -> u8 {
    match byte {
        b'\\' => b'/',
        other => other.to_ascii_lowercase(),
    }
}

/// A stored checksum that disagrees with the hash of its bound name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumMismatch {
    /// Index of the entry in assembled order.
    pub index: usize,
    /// Checksum from the directory.
    pub stored: u32,
    /// Checksum computed from the name.
    pub computed: u32,
}

/// Immutable name → location table.
///
/// Entries keep assembled order; names are unique.
#[derive(Debug, Clone, Default)]
pub struct EntryTable {
    entries: Vec<PfsEntry>,
    index: FxHashMap<Box<[u8]>, usize>,
}

impl EntryTable {
    /// Number of distinct names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in assembled order.
    #[inline]
    pub fn entries(&self) -> &[PfsEntry] {
        &self.entries
    }

    /// Entry by position.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&PfsEntry> {
        self.entries.get(index)
    }

    /// Exact lookup by stored name.
    #[inline]
    pub fn lookup(&self, name: &[u8]) -> Option<&PfsEntry> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }
}

/// Bind decoded names to the directory's non-reserved entries by position.
///
/// The *i*-th name goes with the *i*-th entry once the filename table entry
/// is removed. A repeated name keeps its first position but takes the later
/// entry's location.
pub fn assemble(directory: &Directory, filenames: Vec<Box<[u8]>>) -> Result<EntryTable> {
    if filenames.len() != directory.file_count() {
        return Err(Error::NameCountMismatch {
            names: filenames.len(),
            entries: directory.file_count(),
        });
    }

    let mut entries: Vec<PfsEntry> = Vec::with_capacity(filenames.len());
    let mut index = FxHashMap::with_capacity_and_hasher(filenames.len(), Default::default());

    for (name, location) in filenames.into_iter().zip(directory.file_entries()) {
        match index.get(&name).copied() {
            Some(slot) => {
                debug!(
                    name = %String::from_utf8_lossy(&name),
                    "duplicate entry name, keeping the later location"
                );
                entries[slot] = PfsEntry::new(name, location);
            }
            None => {
                index.insert(name.clone(), entries.len());
                entries.push(PfsEntry::new(name, location));
            }
        }
    }

    Ok(EntryTable { entries, index })
}
