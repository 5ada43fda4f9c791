pub mod buffer;
pub mod builder;
pub mod context;
pub mod document;
pub mod opcodes;
pub mod operation;
pub mod reader;
pub mod registry;
pub mod variables;

// Re-export core types
pub use self::buffer::{WireBuffer, OPCODE_MASK, SIZED_RECORD};
pub use self::builder::DocumentBuilder;
pub use self::context::{DocumentProperty, PaintContext, PaintError, PaintResult, RemoteContext, TextRun};
pub use self::document::{DecodeLimits, DecodeOptions, Document, UnknownOpcodePolicy};
pub use self::opcodes::Opcode;
pub use self::operation::{Decode, DependencyRegistrar, Operation, VariableSupport};
pub use self::reader::WireReader;
pub use self::registry::{OpcodeRegistry, RecordShape};
pub use self::variables::{ColorSlot, FloatSlot, Resolver, TextSlot, Variable, VariableId, VariableSource};
