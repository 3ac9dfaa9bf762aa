//! PFS archive reader.
//!
//! The header, directory, and filename table are parsed once at open. Payloads
//! are sliced out of the mapping by absolute offset on demand, so a shared
//! `&PfsArchive` can serve reads from any number of threads.

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;
use tracing::{debug, trace, warn};
use velious_common::ByteReader;

use crate::decompress::{inflate_block, read_block};
use crate::directory::{read_directory, DirectoryEntry};
use crate::entry::{assemble, ChecksumMismatch, EntryTable, PfsEntry};
use crate::filenames::decode_filenames;
use crate::format::MAX_INFLATED_LEN;
use crate::header::{read_header, ArchiveHeader};
use crate::{Error, Result};

/// Bytes behind an archive.
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for Backing {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Backing::Mapped(mmap) => mmap,
            Backing::Owned(data) => data,
        }
    }
}

/// An opened PFS archive.
pub struct PfsArchive {
    /// Memory-mapped file or owned buffer
    data: Backing,
    /// Archive file name
    name: String,
    header: ArchiveHeader,
    /// Directory slot of the filename table
    filename_table: DirectoryEntry,
    entries: EntryTable,
}

impl PfsArchive {
    /// Open and index a PFS archive on disk.
    ///
    /// Either the whole index is built or an error is returned; a partially
    /// parsed archive is never handed out.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Self::load(Backing::Mapped(mmap), name)
    }

    /// Index an archive that is already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::load(Backing::Owned(data), "memory".to_string())
    }

    fn load(data: Backing, name: String) -> Result<Self> {
        let header = read_header(&data)?;
        let directory = read_directory(&data, &header)?;
        let filenames = decode_filenames(&data, directory.filename_entry())?;
        let entries = assemble(&directory, filenames)?;
        let filename_table = *directory.filename_entry();

        debug!(
            archive = %name,
            size = data.len(),
            entries = entries.len(),
            "opened PFS archive"
        );

        Ok(Self {
            data,
            name,
            header,
            filename_table,
            entries,
        })
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The validated file header.
    #[inline]
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Directory slot holding the filename table.
    #[inline]
    pub fn filename_table_entry(&self) -> &DirectoryEntry {
        &self.filename_table
    }

    /// Size of the archive in bytes.
    #[inline]
    pub fn archive_size(&self) -> usize {
        self.data.len()
    }

    /// Number of named entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive holds no named entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in assembled order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PfsEntry> + '_ {
        self.entries.entries().iter()
    }

    /// Entry names in assembled order.
    pub fn list_names(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.iter().map(PfsEntry::name)
    }

    /// Get entry by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&PfsEntry> {
        self.entries.get(index)
    }

    /// Look up an entry by its exact stored name.
    #[inline]
    pub fn entry(&self, name: impl AsRef<[u8]>) -> Option<&PfsEntry> {
        self.entries.lookup(name.as_ref())
    }

    /// Find an entry by name, ignoring ASCII case, separator style, and a
    /// trailing NUL.
    pub fn find(&self, name: impl AsRef<[u8]>) -> Option<&PfsEntry> {
        let name = name.as_ref();
        self.entry(name)
            .or_else(|| self.iter().find(|entry| entry.matches(name)))
    }

    /// Read an entry's payload by exact name.
    ///
    /// A failure here leaves the archive usable for other entries.
    pub fn read_entry(&self, name: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let name = name.as_ref();
        let entry = self
            .entry(name)
            .ok_or_else(|| Error::NotFound(String::from_utf8_lossy(name).into_owned()))?;
        self.read(entry)
    }

    /// Read an entry's payload into an owned buffer.
    pub fn read(&self, entry: &PfsEntry) -> Result<Vec<u8>> {
        self.payload(entry).map(<[u8]>::to_vec)
    }

    /// Borrow an entry's payload straight from the archive.
    pub fn payload(&self, entry: &PfsEntry) -> Result<&[u8]> {
        let start = entry.offset() as usize;
        let size = entry.size() as usize;

        match start.checked_add(size) {
            Some(end) if end <= self.data.len() => Ok(&self.data[start..end]),
            _ => Err(Error::TruncatedPayload {
                name: entry.name_lossy().into_owned(),
                offset: start as u64,
                size: size as u64,
                available: self.data.len().saturating_sub(start) as u64,
            }),
        }
    }

    /// Inflate an entry's payload by exact name.
    pub fn inflate_entry(&self, name: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let name = name.as_ref();
        let entry = self
            .entry(name)
            .ok_or_else(|| Error::NotFound(String::from_utf8_lossy(name).into_owned()))?;
        self.inflate(entry)
    }

    /// Inflate an entry whose payload is a run of compressed blocks.
    ///
    /// Blocks are decoded back to back until the payload range is used up.
    pub fn inflate(&self, entry: &PfsEntry) -> Result<Vec<u8>> {
        let payload = self.payload(entry)?;
        let mut reader = ByteReader::new(payload);
        let mut output = Vec::new();
        let mut blocks = 0usize;

        while !reader.is_empty() {
            let block_start = reader.position();
            let (block, compressed) =
                read_block(&mut reader).map_err(|_| Error::TruncatedPayload {
                    name: entry.name_lossy().into_owned(),
                    offset: entry.offset() as u64,
                    size: entry.size() as u64,
                    available: block_start as u64,
                })?;

            trace!(
                block = blocks,
                offset = block_start,
                compressed = block.compressed_length,
                inflated = block.inflated_length,
                "inflating payload block"
            );

            output.extend_from_slice(&inflate_block(compressed, block.inflated_length)?);
            if output.len() as u64 > MAX_INFLATED_LEN {
                return Err(Error::DecompressionFailed(format!(
                    "inflated data exceeds {} bytes",
                    MAX_INFLATED_LEN
                )));
            }
            blocks += 1;
        }

        debug!(
            name = %entry.name_lossy(),
            blocks,
            inflated = output.len(),
            "inflated entry"
        );

        Ok(output)
    }

    /// Compare every entry's stored checksum against `hash(name)`.
    ///
    /// The archive format does not pin down the hash, so the caller supplies
    /// it. Mismatches are reported and logged; they never fail the archive.
    pub fn verify_checksums<F>(&self, hash: F) -> Vec<ChecksumMismatch>
    where
        F: Fn(&[u8]) -> u32,
    {
        self.iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let computed = hash(entry.name());
                (computed != entry.checksum()).then(|| {
                    warn!(
                        name = %entry.name_lossy(),
                        stored = entry.checksum(),
                        computed,
                        "checksum mismatch"
                    );
                    ChecksumMismatch {
                        index,
                        stored: entry.checksum(),
                        computed,
                    }
                })
            })
            .collect()
    }

    /// Parallel extraction of multiple entries.
    #[cfg(feature = "parallel")]
    pub fn read_parallel(&self, entries: &[&PfsEntry]) -> Vec<Result<Vec<u8>>> {
        use rayon::prelude::*;

        entries.par_iter().map(|entry| self.read(entry)).collect()
    }

    /// Parallel extraction by index with a per-entry callback.
    ///
    /// Unknown indices fail the whole call before any entry is read.
    #[cfg(feature = "parallel")]
    pub fn extract_parallel<F>(&self, indices: &[usize], callback: F) -> Result<()>
    where
        F: Fn(usize, &PfsEntry, Result<Vec<u8>>) + Sync,
    {
        self.extract_parallel_with(indices, Self::read, callback)
    }

    /// Like [`extract_parallel`](Self::extract_parallel), but each entry is
    /// loaded with `load` (e.g. [`PfsArchive::inflate`]) instead of a raw read.
    #[cfg(feature = "parallel")]
    pub fn extract_parallel_with<L, F>(&self, indices: &[usize], load: L, callback: F) -> Result<()>
    where
        L: Fn(&Self, &PfsEntry) -> Result<Vec<u8>> + Sync,
        F: Fn(usize, &PfsEntry, Result<Vec<u8>>) + Sync,
    {
        use rayon::prelude::*;

        if let Some(&bad) = indices.iter().find(|&&idx| idx >= self.len()) {
            return Err(Error::NotFound(format!("entry index {}", bad)));
        }

        indices.par_iter().for_each(|&idx| {
            let entry = &self.entries.entries()[idx];
            callback(idx, entry, load(self, entry));
        });

        Ok(())
    }
}

impl std::fmt::Debug for PfsArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PfsArchive")
            .field("name", &self.name)
            .field("header", &self.header)
            .field("entries", &self.entries.len())
            .finish()
    }
}
