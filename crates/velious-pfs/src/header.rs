//! PFS file header.

use tracing::debug;
use velious_common::ByteReader;

use crate::format::{RawHeader, FORMAT_VERSION, HEADER_SIZE, MAGIC};
use crate::{Error, Result};

/// The validated 12-byte preamble of a PFS archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArchiveHeader {
    /// Absolute offset of the directory.
    pub directory_offset: u32,
    /// Signature bytes, always `PFS ` once validated.
    pub magic: [u8; 4],
    /// Format constant, always [`FORMAT_VERSION`] once validated.
    pub format_version: u32,
}

impl From<RawHeader> for ArchiveHeader {
    fn from(raw: RawHeader) -> Self {
        Self {
            directory_offset: raw.directory_offset.get(),
            magic: raw.magic,
            format_version: raw.format_version.get(),
        }
    }
}

/// Parse and validate the header at the start of `data`.
///
/// The signature is checked before the format constant, so a foreign file is
/// reported as [`Error::BadMagic`] rather than as an unsupported version.
pub fn read_header(data: &[u8]) -> Result<ArchiveHeader> {
    let malformed = || Error::MalformedHeader {
        expected: HEADER_SIZE,
        actual: data.len(),
    };

    if data.len() < HEADER_SIZE {
        return Err(malformed());
    }

    let raw: RawHeader = ByteReader::new(data)
        .read_struct()
        .map_err(|_| malformed())?;
    let header = ArchiveHeader::from(raw);

    if header.magic != MAGIC {
        return Err(Error::BadMagic(header.magic));
    }
    if header.format_version != FORMAT_VERSION {
        return Err(Error::UnsupportedVersion(header.format_version));
    }

    debug!(
        directory_offset = header.directory_offset,
        "read PFS header"
    );

    Ok(header)
}
