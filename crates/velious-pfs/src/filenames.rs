//! Filename table decoding.
//!
//! Entry names are not stored in the directory. Instead one reserved entry
//! holds a compressed list of every other entry's name, in directory order.

use tracing::debug;
use velious_common::ByteReader;

use crate::decompress::{inflate_block, read_block};
use crate::directory::DirectoryEntry;
use crate::{Error, Result};

/// Read, inflate, and parse the filename table held by `filename_entry`.
pub fn decode_filenames(data: &[u8], filename_entry: &DirectoryEntry) -> Result<Vec<Box<[u8]>>> {
    let mut reader = ByteReader::at(data, filename_entry.payload_offset as usize);
    let (block, compressed) = read_block(&mut reader)
        .map_err(|e| Error::TruncatedFilenameTable(format!("compressed block: {}", e)))?;

    let table = inflate_block(compressed, block.inflated_length)?;
    parse_filename_table(&table)
}

/// Parse an inflated filename table.
///
/// Names are kept as raw bytes, exactly as long as their length prefix says.
/// Bytes after the last name are ignored.
pub fn parse_filename_table(table: &[u8]) -> Result<Vec<Box<[u8]>>> {
    let mut reader = ByteReader::new(table);

    let declared = reader
        .read_u32()
        .map_err(|_| Error::TruncatedFilenameTable("missing name count".to_string()))?;

    // Each name needs at least its length prefix.
    let mut names = Vec::with_capacity((declared as usize).min(reader.remaining() / 4));

    for index in 0..declared {
        let length = reader.read_u32().map_err(|_| {
            Error::TruncatedFilenameTable(format!(
                "missing length of name {} of {}",
                index + 1,
                declared
            ))
        })?;

        let name = reader.read_bytes(length as usize).map_err(|_| {
            Error::TruncatedFilenameTable(format!(
                "name {} of {} needs {} bytes, {} left",
                index + 1,
                declared,
                length,
                reader.remaining()
            ))
        })?;

        names.push(Box::from(name));
    }

    if !reader.is_empty() {
        debug!(
            trailing = reader.remaining(),
            "ignoring bytes after filename table"
        );
    }

    debug!(names = names.len(), "decoded filename table");

    Ok(names)
}
