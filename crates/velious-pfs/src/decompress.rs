//! Compressed block handling.
//!
//! A block is an 8-byte [`RawBlockHeader`] followed by a zlib stream of
//! `compressed_length` bytes. The filename table is stored as one block;
//! entry payloads may be a run of blocks laid back to back.

use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::{trace, warn};
use velious_common::ByteReader;

use crate::format::{RawBlockHeader, MAX_INFLATED_LEN};
use crate::{Error, Result};

/// Block header values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Length of the zlib stream.
    pub compressed_length: u32,
    /// Declared length once inflated.
    pub inflated_length: u32,
}

/// Read a block header and borrow its compressed bytes, advancing past both.
pub(crate) fn read_block<'a>(
    reader: &mut ByteReader<'a>,
) -> velious_common::Result<(BlockHeader, &'a [u8])> {
    let raw: RawBlockHeader = reader.read_struct()?;
    let header = BlockHeader {
        compressed_length: raw.compressed_length.get(),
        inflated_length: raw.inflated_length.get(),
    };
    let compressed = reader.read_bytes(header.compressed_length as usize)?;
    Ok((header, compressed))
}

/// Inflate one zlib stream.
///
/// The decoder only ever sees `compressed`, and its output is capped at
/// [`MAX_INFLATED_LEN`]. A length other than `inflated_length` is logged
/// and tolerated.
pub fn inflate_block(compressed: &[u8], inflated_length: u32) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed).take(MAX_INFLATED_LEN + 1);

    let mut output = Vec::with_capacity((inflated_length as usize).min(1 << 20));
    decoder
        .read_to_end(&mut output)
        .map_err(|e| Error::DecompressionFailed(e.to_string()))?;

    if output.len() as u64 > MAX_INFLATED_LEN {
        return Err(Error::DecompressionFailed(format!(
            "inflated data exceeds {} bytes",
            MAX_INFLATED_LEN
        )));
    }

    if output.len() != inflated_length as usize {
        warn!(
            expected = inflated_length,
            actual = output.len(),
            "inflated length mismatch"
        );
    }

    trace!(
        compressed = compressed.len(),
        inflated = output.len(),
        "inflated block"
    );

    Ok(output)
}
