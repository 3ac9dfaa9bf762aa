//! Bounds-checked binary reader over byte slices.
//!
//! Archive formats address their structures by absolute offset, so a
//! [`ByteReader`] can be positioned anywhere in a buffer (including past its
//! end) and only fails once a read actually needs bytes that are not there.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// A cursor over a byte slice that reads little-endian values.
///
/// # Example
///
/// ```
/// use velious_common::ByteReader;
///
/// let data = [0xFF, 0xFF, 0x01, 0x00, 0x00, 0x00];
/// let mut reader = ByteReader::at(&data, 2);
///
/// assert_eq!(reader.read_u32().unwrap(), 1);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a reader positioned at an absolute offset.
    ///
    /// The offset may lie beyond the end of `data`; the first read will then
    /// report an [`Error::UnexpectedEof`].
    #[inline]
    pub const fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            position: offset,
        }
    }

    /// Current absolute position.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left before the end of the data.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Whether every byte has been consumed.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail unless at least `count` more bytes are available.
    #[inline]
    pub fn ensure(&self, count: usize) -> Result<()> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                offset: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Borrow the next `count` bytes and advance past them.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self
            .position
            .checked_add(count)
            .and_then(|end| self.data.get(self.position..end))
            .ok_or(Error::UnexpectedEof {
                offset: self.position,
                needed: count,
                available: self.remaining(),
            })?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a fixed-layout record using zerocopy.
    ///
    /// Records should be built from byte-order-aware field types
    /// (`zerocopy::little_endian::U32` and friends) so this is endian-safe.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let offset = self.position;
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            offset,
            needed: size,
            available: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u32_little_endian() {
        let data = [0x01u8, 0x02, 0x03, 0x04, 0x00, 0x00, 0x02, 0x00];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), 131072);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_eof_reports_offset() {
        let data = [0u8; 6];
        let mut reader = ByteReader::at(&data, 4);

        match reader.read_u32() {
            Err(Error::UnexpectedEof {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 4);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
        // A failed read does not move the cursor.
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_position_past_end() {
        let data = [0u8; 4];
        let reader = ByteReader::at(&data, 100);

        assert_eq!(reader.remaining(), 0);
        assert!(reader.ensure(1).is_err());
        assert!(reader.ensure(0).is_ok());
    }

    #[test]
    fn test_empty_read_past_end_errors() {
        let data = [0u8; 4];
        let mut reader = ByteReader::at(&data, 100);

        assert!(matches!(
            reader.read_bytes(0),
            Err(Error::UnexpectedEof {
                offset: 100,
                needed: 0,
                available: 0
            })
        ));
        assert_eq!(reader.position(), 100);

        // At the exact end an empty read is still fine.
        let mut reader = ByteReader::at(&data, 4);
        assert_eq!(reader.read_bytes(0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_read_bytes_borrows() {
        let data = *b"PFS \x00\x00";
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_bytes(4).unwrap(), b"PFS ");
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.remaining(), 2);
    }
}
