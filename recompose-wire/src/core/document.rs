//! Documents and the record decode loop
//!
//! Decoding is a single synchronous pass:
//! `AwaitingRecord → ReadOpcode → DispatchDecoder → AppendOperation → AwaitingRecord`,
//! ending at `EndOfStream` when no bytes remain on a record boundary. Any
//! failure aborts the whole decode; a partial document is never returned.

use std::fmt;

use crate::core::buffer::{WireBuffer, OPCODE_MASK, SIZED_RECORD};
use crate::core::operation::Operation;
use crate::core::reader::{WireReader, MAX_BLOB_SIZE, MAX_STRING_SIZE};
use crate::core::registry::{OpcodeRegistry, RecordShape};
use crate::error::{Result, WireError};
use crate::operations::protocol::Header;

/// Default maximum number of operations in one document
pub const MAX_OPERATIONS: usize = 1_000_000;

/// What to do with a record whose opcode has no registered decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpcodePolicy {
    /// Fail the decode with [`WireError::UnknownOpcode`]
    #[default]
    Strict,
    /// Skip unknown sized records with a warning. Unknown records without a
    /// length prefix cannot be skipped and still fail.
    Skip,
}

/// Resource limits applied while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_string_len: usize,
    pub max_blob_len: usize,
    pub max_operations: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_string_len: MAX_STRING_SIZE,
            max_blob_len: MAX_BLOB_SIZE,
            max_operations: MAX_OPERATIONS,
        }
    }
}

impl DecodeLimits {
    pub fn with_max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = len;
        self
    }

    pub fn with_max_blob_len(mut self, len: usize) -> Self {
        self.max_blob_len = len;
        self
    }

    pub fn with_max_operations(mut self, count: usize) -> Self {
        self.max_operations = count;
        self
    }
}

/// Decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub unknown_opcode: UnknownOpcodePolicy,
    pub limits: DecodeLimits,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self::default().with_unknown_opcode(UnknownOpcodePolicy::Skip)
    }

    pub fn with_unknown_opcode(mut self, policy: UnknownOpcodePolicy) -> Self {
        self.unknown_opcode = policy;
        self
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Ordered list of decoded operations. List order is replay order.
#[derive(Debug, Default)]
pub struct Document {
    operations: Vec<Box<dyn Operation>>,
}

impl Document {
    pub fn new(operations: Vec<Box<dyn Operation>>) -> Self {
        Self { operations }
    }

    /// Decode with the default (strict) options
    pub fn decode(bytes: &[u8], registry: &OpcodeRegistry) -> Result<Self> {
        Self::decode_with(bytes, registry, &DecodeOptions::default())
    }

    pub fn decode_with(
        bytes: &[u8],
        registry: &OpcodeRegistry,
        options: &DecodeOptions,
    ) -> Result<Self> {
        DocumentDecoder::new(bytes, registry, options).run()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Operation> {
        self.operations.get(index).map(|op| op.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Operation> + '_ {
        self.operations.iter().map(|op| op.as_ref())
    }

    pub fn operations(&self) -> &[Box<dyn Operation>] {
        &self.operations
    }

    /// Mutable access, used by the update pass to refresh cached values
    pub fn operations_mut(&mut self) -> &mut [Box<dyn Operation>] {
        &mut self.operations
    }

    /// Re-encode every operation in order
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = WireBuffer::new();
        for operation in &self.operations {
            operation.write(&mut buffer);
        }
        buffer.into_bytes()
    }

    /// The leading header record, if the document has one
    pub fn header(&self) -> Option<&Header> {
        self.operations.first().and_then(|op| op.downcast_ref::<Header>())
    }

    /// Indented listing of every operation
    pub fn deep_to_string(&self, indent: &str) -> String {
        let mut out = String::new();
        for operation in &self.operations {
            out.push_str(&operation.deep_to_string(indent));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.deep_to_string(""))
    }
}

/// Position of the decoder in the record state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    AwaitingRecord,
    ReadOpcode,
    DispatchDecoder { opcode: u32, sized: bool, offset: usize },
    AppendOperation,
    EndOfStream,
}

struct DocumentDecoder<'a> {
    reader: WireReader<'a>,
    registry: &'a OpcodeRegistry,
    options: &'a DecodeOptions,
    operations: Vec<Box<dyn Operation>>,
    pending: Vec<Box<dyn Operation>>,
    skipped: usize,
}

impl<'a> DocumentDecoder<'a> {
    fn new(bytes: &'a [u8], registry: &'a OpcodeRegistry, options: &'a DecodeOptions) -> Self {
        let limits = &options.limits;
        Self {
            reader: WireReader::with_limits(bytes, limits.max_string_len, limits.max_blob_len),
            registry,
            options,
            operations: Vec::new(),
            pending: Vec::new(),
            skipped: 0,
        }
    }

    fn run(mut self) -> Result<Document> {
        let mut state = DecoderState::AwaitingRecord;
        loop {
            state = match state {
                DecoderState::AwaitingRecord => {
                    if self.reader.is_empty() {
                        DecoderState::EndOfStream
                    } else {
                        DecoderState::ReadOpcode
                    }
                }
                DecoderState::ReadOpcode => {
                    let offset = self.reader.offset();
                    let tag = self.reader.read_u32()?;
                    DecoderState::DispatchDecoder {
                        opcode: tag & OPCODE_MASK,
                        sized: tag & SIZED_RECORD != 0,
                        offset,
                    }
                }
                DecoderState::DispatchDecoder {
                    opcode,
                    sized,
                    offset,
                } => self.dispatch(opcode, sized, offset)?,
                DecoderState::AppendOperation => {
                    self.append()?;
                    DecoderState::AwaitingRecord
                }
                DecoderState::EndOfStream => break,
            };
        }

        tracing::debug!(
            operations = self.operations.len(),
            skipped = self.skipped,
            bytes = self.reader.position(),
            "decoded document"
        );
        Ok(Document::new(self.operations))
    }

    fn dispatch(&mut self, opcode: u32, sized: bool, offset: usize) -> Result<DecoderState> {
        let declared = if sized {
            Some(self.reader.read_u32()? as usize)
        } else {
            None
        };

        let Some(entry) = self.registry.lookup(opcode) else {
            return match (declared, self.options.unknown_opcode) {
                (Some(len), UnknownOpcodePolicy::Skip) => {
                    self.reader.sub_reader(len)?;
                    self.skipped += 1;
                    tracing::warn!(opcode, offset, len, "skipped record with unknown opcode");
                    Ok(DecoderState::AwaitingRecord)
                }
                _ => Err(WireError::UnknownOpcode { opcode, offset }),
            };
        };

        let len = match (entry.shape, declared) {
            (RecordShape::Fixed(len), None) => len,
            (RecordShape::Sized, Some(len)) => len,
            // Framing bit disagrees with the registered shape
            (RecordShape::Fixed(len), Some(declared)) => {
                return Err(WireError::LengthMismatch {
                    opcode,
                    offset,
                    declared,
                    consumed: len,
                });
            }
            (RecordShape::Sized, None) => {
                return Err(WireError::InvalidField {
                    operation: entry.name,
                    field: "record tag",
                    value: i64::from(opcode),
                });
            }
        };

        tracing::trace!(opcode, name = entry.name, offset, len, "dispatching record");
        let mut payload = self.reader.sub_reader(len)?;
        (entry.decode)(&mut payload, &mut self.pending)?;
        if !payload.is_empty() {
            return Err(WireError::LengthMismatch {
                opcode,
                offset,
                declared: len,
                consumed: payload.position(),
            });
        }
        Ok(DecoderState::AppendOperation)
    }

    fn append(&mut self) -> Result<()> {
        let total = self.operations.len() + self.pending.len();
        let limit = self.options.limits.max_operations;
        if total > limit {
            return Err(WireError::LimitExceeded {
                kind: "operation count",
                length: total,
                limit,
            });
        }
        self.operations.append(&mut self.pending);
        Ok(())
    }
}
