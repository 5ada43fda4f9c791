//! Record writer for the document wire format
//!
//! Every record starts with a little-endian `u32` tag holding the opcode.
//! Fixed-shape records carry their payload right after the tag. Variable-shape
//! records set [`SIZED_RECORD`] in the tag and reserve a `u32` length that is
//! backpatched once the payload is complete.

use byteorder::{ByteOrder, LittleEndian};

/// Tag bit marking a record whose payload is preceded by a `u32` length
pub const SIZED_RECORD: u32 = 0x8000_0000;

/// Mask extracting the opcode from a record tag
pub const OPCODE_MASK: u32 = !SIZED_RECORD;

/// Growable byte buffer with record framing
#[derive(Debug, Default, Clone)]
pub struct WireBuffer {
    bytes: Vec<u8>,
    /// Offset of the reserved length slot of the open sized record
    length_slot: Option<usize>,
    records: usize,
}

impl WireBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            length_slot: None,
            records: 0,
        }
    }

    /// Begin a fixed-shape record
    pub fn start(&mut self, opcode: u32) {
        self.end_record();
        debug_assert_eq!(opcode & SIZED_RECORD, 0, "opcode {opcode:#x} uses the size bit");
        self.write_u32(opcode & OPCODE_MASK);
        self.records += 1;
    }

    /// Begin a variable-shape record whose length is backpatched by
    /// [`end_record`](Self::end_record) or the next `start*` call.
    pub fn start_sized(&mut self, opcode: u32) {
        self.end_record();
        self.write_u32((opcode & OPCODE_MASK) | SIZED_RECORD);
        self.length_slot = Some(self.bytes.len());
        self.write_u32(0);
        self.records += 1;
    }

    /// Close the open sized record, if any, by writing its payload length
    pub fn end_record(&mut self) {
        if let Some(slot) = self.length_slot.take() {
            let payload = self.bytes.len() - slot - 4;
            LittleEndian::write_u32(&mut self.bytes[slot..slot + 4], payload as u32);
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    pub fn write_i32(&mut self, value: i32) {
        LittleEndian::write_i32(self.reserve(4), value);
    }

    pub fn write_u32(&mut self, value: u32) {
        LittleEndian::write_u32(self.reserve(4), value);
    }

    pub fn write_i64(&mut self, value: i64) {
        LittleEndian::write_i64(self.reserve(8), value);
    }

    pub fn write_u64(&mut self, value: u64) {
        LittleEndian::write_u64(self.reserve(8), value);
    }

    /// Writes the raw bit pattern, so NaN payloads survive
    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    /// Length-prefixed UTF-8 string
    pub fn write_utf8(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Length-prefixed blob
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.write_u32(value.len() as u32);
        self.bytes.extend_from_slice(value);
    }

    /// Count-prefixed float array
    pub fn write_f32_array(&mut self, values: &[f32]) {
        self.write_u32(values.len() as u32);
        for value in values {
            self.write_f32(*value);
        }
    }

    /// Count-prefixed int array
    pub fn write_i32_array(&mut self, values: &[i32]) {
        self.write_u32(values.len() as u32);
        for value in values {
            self.write_i32(*value);
        }
    }

    /// Grow by `width` zeroed bytes and hand back the new tail
    fn reserve(&mut self, width: usize) -> &mut [u8] {
        let start = self.bytes.len();
        self.bytes.resize(start + width, 0);
        &mut self.bytes[start..]
    }

    /// Number of records started so far
    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes written so far, closing any open record first
    pub fn as_bytes(&mut self) -> &[u8] {
        self.end_record();
        &self.bytes
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.end_record();
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_record_layout() {
        let mut buffer = WireBuffer::new();
        buffer.start(46);
        buffer.write_f32(1.0);
        let bytes = buffer.into_bytes();
        assert_eq!(&bytes[..4], &[46, 0, 0, 0]);
        assert_eq!(&bytes[4..], &1.0f32.to_le_bytes());
    }

    #[test]
    fn test_sized_record_backpatch() {
        let mut buffer = WireBuffer::new();
        buffer.start_sized(102);
        buffer.write_i32(42);
        buffer.write_utf8("hi");
        buffer.start(130);
        let bytes = buffer.into_bytes();

        let tag = LittleEndian::read_u32(&bytes[0..4]);
        assert_eq!(tag & OPCODE_MASK, 102);
        assert_ne!(tag & SIZED_RECORD, 0);
        // i32 + (u32 length + 2 bytes)
        assert_eq!(LittleEndian::read_u32(&bytes[4..8]), 10);
        assert_eq!(LittleEndian::read_u32(&bytes[18..22]), 130);
        assert_eq!(bytes.len(), 22);
    }

    #[test]
    fn test_unclosed_record_closed_on_finish() {
        let mut buffer = WireBuffer::new();
        buffer.start_sized(123);
        buffer.write_f32_array(&[1.0, 2.0]);
        assert_eq!(buffer.record_count(), 1);
        let bytes = buffer.into_bytes();
        assert_eq!(LittleEndian::read_u32(&bytes[4..8]), 12);
    }

    #[test]
    fn test_nan_bits_preserved() {
        let nan = f32::from_bits(0xFF80_002A);
        let mut buffer = WireBuffer::new();
        buffer.write_f32(nan);
        assert_eq!(buffer.as_bytes(), &0xFF80_002Au32.to_le_bytes());
    }

    #[test]
    fn test_wide_fields_little_endian() {
        let mut buffer = WireBuffer::new();
        buffer.write_i32(-2);
        buffer.write_u64(0x0102_0304_0506_0708);
        buffer.write_i64(-1);
        let bytes = buffer.into_bytes();
        assert_eq!(&bytes[..4], &[0xFE, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[4..12], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(LittleEndian::read_i64(&bytes[12..20]), -1);
        assert_eq!(bytes.len(), 20);
    }
}
