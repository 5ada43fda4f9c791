//! Borrowing reader over an encoded document

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, WireError};

/// Default maximum string length in bytes
pub const MAX_STRING_SIZE: usize = 4000;

/// Default maximum blob length in bytes (16 MiB)
pub const MAX_BLOB_SIZE: usize = 16 * 1024 * 1024;

/// Cursor over a byte slice. Reads fail with [`WireError::Truncated`]
/// instead of panicking when fewer bytes remain than requested.
///
/// Sub-readers borrow the same slice, so decoding a record payload never
/// copies the outer buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Absolute offset of `data[0]` in the outermost stream
    base: usize,
    max_string: usize,
    max_blob: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, MAX_STRING_SIZE, MAX_BLOB_SIZE)
    }

    pub fn with_limits(data: &'a [u8], max_string: usize, max_blob: usize) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
            max_string,
            max_blob,
        }
    }

    /// Absolute offset of the cursor in the outermost stream
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes consumed from this reader
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8]> {
        if self.remaining() < needed {
            return Err(WireError::Truncated {
                offset: self.offset(),
                needed,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    /// Split off the next `len` bytes as an independent reader and advance past them
    pub fn sub_reader(&mut self, len: usize) -> Result<WireReader<'a>> {
        let base = self.offset();
        let data = self.take(len)?;
        Ok(WireReader {
            data,
            pos: 0,
            base,
            max_string: self.max_string,
            max_blob: self.max_blob,
        })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        let offset = self.offset();
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(WireError::InvalidBool { offset, value }),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(LittleEndian::read_i64(self.take(8)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Length-prefixed blob, borrowed from the stream
    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        if len > self.max_blob {
            return Err(WireError::LimitExceeded {
                kind: "blob",
                length: len,
                limit: self.max_blob,
            });
        }
        self.take(len)
    }

    /// Length-prefixed UTF-8 string, borrowed from the stream
    pub fn read_utf8(&mut self) -> Result<&'a str> {
        let len = self.read_u32()? as usize;
        if len > self.max_string {
            return Err(WireError::LimitExceeded {
                kind: "string",
                length: len,
                limit: self.max_string,
            });
        }
        let offset = self.offset();
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8 { offset })
    }

    /// Count-prefixed float array
    pub fn read_f32_array(&mut self) -> Result<Vec<f32>> {
        let count = self.read_count(4)?;
        (0..count).map(|_| self.read_f32()).collect()
    }

    /// Count-prefixed int array
    pub fn read_i32_array(&mut self) -> Result<Vec<i32>> {
        let count = self.read_count(4)?;
        (0..count).map(|_| self.read_i32()).collect()
    }

    /// Reads an element count and checks the elements can actually be present,
    /// so a corrupt count cannot trigger a huge allocation.
    pub fn read_count(&mut self, min_element_size: usize) -> Result<usize> {
        let count = self.read_u32()? as usize;
        let needed = count.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(WireError::Truncated {
                offset: self.offset(),
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::WireBuffer;

    #[test]
    fn test_read_primitives_in_order() {
        let mut buffer = WireBuffer::new();
        buffer.write_i32(-7);
        buffer.write_f32(2.5);
        buffer.write_bool(true);
        buffer.write_utf8("abc");
        buffer.write_i64(i64::MIN);
        let bytes = buffer.into_bytes();

        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_i32().unwrap(), -7);
        assert_eq!(reader.read_f32().unwrap(), 2.5);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_utf8().unwrap(), "abc");
        assert_eq!(reader.read_i64().unwrap(), i64::MIN);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_underflow_reports_offset() {
        let bytes = [1u8, 2, 3];
        let mut reader = WireReader::new(&bytes);
        let err = reader.read_i32().unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                offset: 0,
                needed: 4,
                remaining: 3
            }
        );
    }

    #[test]
    fn test_invalid_bool() {
        let bytes = [2u8];
        let err = WireReader::new(&bytes).read_bool().unwrap_err();
        assert!(matches!(err, WireError::InvalidBool { value: 2, .. }));
    }

    #[test]
    fn test_string_limit() {
        let mut buffer = WireBuffer::new();
        buffer.write_utf8("too long");
        let bytes = buffer.into_bytes();
        let err = WireReader::with_limits(&bytes, 4, MAX_BLOB_SIZE)
            .read_utf8()
            .unwrap_err();
        assert!(matches!(err, WireError::LimitExceeded { kind: "string", .. }));
    }

    #[test]
    fn test_sub_reader_offsets() {
        let bytes = [0u8, 0, 0, 0, 9, 0, 0, 0, 1];
        let mut reader = WireReader::new(&bytes);
        reader.read_u32().unwrap();
        let mut sub = reader.sub_reader(4).unwrap();
        assert_eq!(sub.offset(), 4);
        assert_eq!(sub.read_u32().unwrap(), 9);
        assert!(sub.read_u8().is_err());
        assert_eq!(reader.read_u8().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_array_count() {
        let mut buffer = WireBuffer::new();
        buffer.write_u32(u32::MAX);
        let bytes = buffer.into_bytes();
        let err = WireReader::new(&bytes).read_f32_array().unwrap_err();
        assert!(err.is_malformed_stream());
    }
}
