//! Recompose wire format
//!
//! A compact, opcode-tagged binary encoding for display lists: drawing
//! primitives, matrix operations, data declarations and expressions that are
//! serialized once and replayed later against a rendering backend.
//!
//! The crate covers everything up to a decoded [`Document`]:
//! - [`WireBuffer`] / [`WireReader`]: little-endian record codec
//! - [`OpcodeRegistry`]: sparse opcode → decoder table
//! - [`Document`]: the ordered operation list and its decode loop
//! - [`DocumentBuilder`]: the encoding side, with id allocation
//!
//! Replaying a document (variable updates, backend calls) lives in
//! `recompose-player`; this crate only defines the seams it needs
//! ([`RemoteContext`], [`PaintContext`], [`VariableSupport`]).

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod operations;

pub use crate::core::{
    builder::DocumentBuilder,
    buffer::WireBuffer,
    context::{DocumentProperty, PaintContext, PaintError, PaintResult, RemoteContext, TextRun},
    document::{DecodeLimits, DecodeOptions, Document, UnknownOpcodePolicy},
    opcodes::Opcode,
    operation::{Decode, DependencyRegistrar, Operation, VariableSupport},
    reader::WireReader,
    registry::{OpcodeRegistry, RecordShape},
    variables::{ColorSlot, FloatSlot, Resolver, TextSlot, Variable, VariableId, VariableSource},
};

pub use crate::error::{Result, WireError};

/// Version information for the document format
pub const WIRE_VERSION_MAJOR: u32 = 0;
pub const WIRE_VERSION_MINOR: u32 = 1;
pub const WIRE_VERSION_PATCH: u32 = 0;
