//! Error types for wire operations

use thiserror::Error;

/// Main error type for encoding and decoding documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Fewer bytes remain than a read requested
    #[error("Truncated stream: needed {needed} bytes at offset {offset:#x}, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A record decoder did not consume exactly the bytes its record declared
    #[error("Record {opcode} at offset {offset:#x} declared {declared} bytes, decoder consumed {consumed}")]
    LengthMismatch {
        opcode: u32,
        offset: usize,
        declared: usize,
        consumed: usize,
    },

    #[error("Invalid boolean byte {value:#04x} at offset {offset:#x}")]
    InvalidBool { offset: usize, value: u8 },

    #[error("Invalid UTF-8 string at offset {offset:#x}")]
    InvalidUtf8 { offset: usize },

    #[error("Invalid {field} value {value} in {operation}")]
    InvalidField {
        operation: &'static str,
        field: &'static str,
        value: i64,
    },

    #[error("{kind} of {length} bytes exceeds the limit of {limit}")]
    LimitExceeded {
        kind: &'static str,
        length: usize,
        limit: usize,
    },

    #[error("Unknown opcode {opcode} at offset {offset:#x}")]
    UnknownOpcode { opcode: u32, offset: usize },

    #[error("Opcode {opcode} is already registered to {existing}")]
    DuplicateOpcode { opcode: u32, existing: &'static str },
}

impl WireError {
    /// Whether this error means the byte stream itself is malformed
    /// (truncated record, bad length prefix, bad primitive encoding).
    pub fn is_malformed_stream(&self) -> bool {
        matches!(
            self,
            WireError::Truncated { .. }
                | WireError::LengthMismatch { .. }
                | WireError::InvalidBool { .. }
                | WireError::InvalidUtf8 { .. }
                | WireError::InvalidField { .. }
                | WireError::LimitExceeded { .. }
        )
    }
}

/// Convenient Result type
pub type Result<T> = std::result::Result<T, WireError>;
