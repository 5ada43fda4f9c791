//! Opcode registry: sparse opcode → decoder table
//!
//! Registries are plain values. Each decode call is handed one explicitly, so
//! differently configured protocol versions can coexist in one process.

use std::fmt;

use ahash::AHashMap;

use crate::core::buffer::SIZED_RECORD;
use crate::core::operation::{decode_into, Decode, Operation};
use crate::core::reader::WireReader;
use crate::error::{Result, WireError};

/// How a record's payload length is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Payload is always exactly this many bytes
    Fixed(usize),
    /// Payload is preceded by a `u32` length
    Sized,
}

/// Decoder for one record payload. Appends zero or more operations.
pub type DecodeFn = fn(&mut WireReader<'_>, &mut Vec<Box<dyn Operation>>) -> Result<()>;

#[derive(Clone, Copy)]
pub struct RegistryEntry {
    pub opcode: u32,
    pub name: &'static str,
    pub shape: RecordShape,
    pub decode: DecodeFn,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("opcode", &self.opcode)
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpcodeRegistry {
    entries: AHashMap<u32, RegistryEntry>,
}

impl OpcodeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in operation kind
    pub fn standard() -> Result<Self> {
        let mut registry = Self::new();
        crate::operations::register_standard(&mut registry)?;
        Ok(registry)
    }

    /// Register a decoder. Registering an opcode twice is an error.
    pub fn register(
        &mut self,
        opcode: u32,
        name: &'static str,
        shape: RecordShape,
        decode: DecodeFn,
    ) -> Result<()> {
        if opcode & SIZED_RECORD != 0 {
            return Err(WireError::InvalidField {
                operation: name,
                field: "opcode",
                value: i64::from(opcode),
            });
        }
        if let Some(existing) = self.entries.get(&opcode) {
            return Err(WireError::DuplicateOpcode {
                opcode,
                existing: existing.name,
            });
        }
        tracing::trace!(opcode, name, "registered decoder");
        self.entries.insert(
            opcode,
            RegistryEntry {
                opcode,
                name,
                shape,
                decode,
            },
        );
        Ok(())
    }

    /// Register a [`Decode`] kind under its own opcode
    pub fn register_kind<T: Decode>(&mut self) -> Result<()> {
        self.register(T::OPCODE, T::NAME, T::SHAPE, decode_into::<T>)
    }

    pub fn lookup(&self, opcode: u32) -> Option<&RegistryEntry> {
        self.entries.get(&opcode)
    }

    pub fn contains(&self, opcode: u32) -> bool {
        self.entries.contains_key(&opcode)
    }

    /// Kind name for an opcode, if registered
    pub fn name(&self, opcode: u32) -> Option<&'static str> {
        self.lookup(opcode).map(|entry| entry.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered opcodes in ascending order
    pub fn opcodes(&self) -> Vec<u32> {
        let mut opcodes: Vec<u32> = self.entries.keys().copied().collect();
        opcodes.sort_unstable();
        opcodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::opcodes::Opcode;
    use crate::operations::geometry::DrawCircle;

    fn no_op(_: &mut WireReader<'_>, _: &mut Vec<Box<dyn Operation>>) -> Result<()> {
        Ok(())
    }

    #[test]
    fn test_standard_registry_covers_builtin_opcodes() {
        let registry = OpcodeRegistry::standard().unwrap();
        assert_eq!(registry.len(), Opcode::ALL.len());
        for opcode in Opcode::ALL {
            assert!(registry.contains(opcode.raw()), "{opcode:?} missing");
        }
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = OpcodeRegistry::new();
        registry.register_kind::<DrawCircle>().unwrap();
        let err = registry
            .register(Opcode::DRAW_CIRCLE.raw(), "Other", RecordShape::Sized, no_op)
            .unwrap_err();
        assert_eq!(
            err,
            WireError::DuplicateOpcode {
                opcode: 46,
                existing: "DrawCircle"
            }
        );
    }

    #[test]
    fn test_lookup_unregistered_is_none() {
        let registry = OpcodeRegistry::standard().unwrap();
        assert!(registry.lookup(1).is_none());
        assert!(registry.lookup(10_000).is_none());
        assert_eq!(registry.name(46), Some("DrawCircle"));
    }

    #[test]
    fn test_sparse_custom_opcode() {
        let mut registry = OpcodeRegistry::new();
        registry
            .register(0x7000_0000, "Custom", RecordShape::Fixed(0), no_op)
            .unwrap();
        assert!(registry.contains(0x7000_0000));
        assert_eq!(registry.opcodes(), vec![0x7000_0000]);
    }

    #[test]
    fn test_size_bit_opcode_rejected() {
        let mut registry = OpcodeRegistry::new();
        assert!(registry
            .register(SIZED_RECORD | 5, "Bad", RecordShape::Sized, no_op)
            .is_err());
    }
}
