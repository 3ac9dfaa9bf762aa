//! Synthetic PFS archives for tests.

#![allow(dead_code)]

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;

pub const FILENAME_TABLE_CHECKSUM: u32 = 0x6158_0AC9;

/// Toy name hash used as the checksum of every synthetic entry.
pub fn name_hash(name: &[u8]) -> u32 {
    name.iter()
        .fold(0x811C_9DC5u32, |hash, &byte| (hash ^ byte as u32).wrapping_mul(0x0100_0193))
}

/// One compressed block: header plus zlib stream.
pub fn block(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(compressed.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
    out.extend_from_slice(&compressed);
    out
}

/// Inflated filename table.
pub fn filename_table(names: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(names.len() as u32).unwrap();
    for name in names {
        out.write_u32::<LittleEndian>(name.len() as u32).unwrap();
        out.extend_from_slice(name);
    }
    out
}

/// Builds `header | payloads | filename table block | directory`.
pub struct ArchiveBuilder {
    files: Vec<(Vec<u8>, Vec<u8>)>,
    names: Option<Vec<Vec<u8>>>,
    filename_table_block: Option<Vec<u8>>,
    filename_table_index: Option<usize>,
    magic: [u8; 4],
    version: u32,
}

/// A built archive plus where its directory landed.
pub struct Built {
    pub bytes: Vec<u8>,
    pub directory_offset: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            names: None,
            filename_table_block: None,
            filename_table_index: None,
            magic: *b"PFS ",
            version: 131072,
        }
    }

    pub fn file(mut self, name: &str, payload: &[u8]) -> Self {
        self.files.push((name.as_bytes().to_vec(), payload.to_vec()));
        self
    }

    pub fn raw_file(mut self, name: &[u8], payload: &[u8]) -> Self {
        self.files.push((name.to_vec(), payload.to_vec()));
        self
    }

    /// Store these names in the filename table instead of the files' own.
    pub fn names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|n| n.as_bytes().to_vec()).collect());
        self
    }

    /// Store these bytes as the filename table entry's payload verbatim.
    pub fn filename_table_payload(mut self, payload: &[u8]) -> Self {
        self.filename_table_block = Some(payload.to_vec());
        self
    }

    /// Directory slot for the filename table; defaults to last.
    pub fn filename_table_at(mut self, index: usize) -> Self {
        self.filename_table_index = Some(index);
        self
    }

    pub fn magic(mut self, magic: &[u8; 4]) -> Self {
        self.magic = *magic;
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn build(self) -> Built {
        let mut bytes = vec![0u8; 12];
        let mut records = Vec::new();

        for (name, payload) in &self.files {
            records.push((name_hash(name), bytes.len() as u32, payload.len() as u32));
            bytes.extend_from_slice(payload);
        }

        let names = self
            .names
            .unwrap_or_else(|| self.files.iter().map(|(name, _)| name.clone()).collect());
        let table = self
            .filename_table_block
            .unwrap_or_else(|| block(&filename_table(&names)));
        let table_record = (FILENAME_TABLE_CHECKSUM, bytes.len() as u32, table.len() as u32);
        bytes.extend_from_slice(&table);

        let index = self.filename_table_index.unwrap_or(records.len());
        records.insert(index, table_record);

        let directory_offset = bytes.len();
        bytes.write_u32::<LittleEndian>(records.len() as u32).unwrap();
        for (checksum, offset, size) in records {
            bytes.write_u32::<LittleEndian>(checksum).unwrap();
            bytes.write_u32::<LittleEndian>(offset).unwrap();
            bytes.write_u32::<LittleEndian>(size).unwrap();
        }

        let mut header = &mut bytes[..12];
        header.write_u32::<LittleEndian>(directory_offset as u32).unwrap();
        header.write_all(&self.magic).unwrap();
        header.write_u32::<LittleEndian>(self.version).unwrap();

        Built {
            bytes,
            directory_offset,
        }
    }
}

impl Built {
    /// Overwrite the payload size of directory slot `index`.
    pub fn set_payload_size(&mut self, index: usize, size: u32) {
        let at = self.directory_offset + 4 + index * 12 + 8;
        self.bytes[at..at + 4].copy_from_slice(&size.to_le_bytes());
    }

    /// Overwrite the checksum of directory slot `index`.
    pub fn set_checksum(&mut self, index: usize, checksum: u32) {
        let at = self.directory_offset + 4 + index * 12;
        self.bytes[at..at + 4].copy_from_slice(&checksum.to_le_bytes());
    }

    /// Keep only the count and the first `records` directory slots.
    pub fn truncate_directory(&mut self, records: usize) {
        self.bytes.truncate(self.directory_offset + 4 + records * 12);
    }

    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.bytes).unwrap();
        file.flush().unwrap();
        file
    }
}
