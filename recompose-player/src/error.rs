//! Error types for attaching and replaying documents

use recompose_wire::{PaintError, WireError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    /// Decoding the document failed, or its header is incompatible
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Operations caught in, or ordered after, a dependency loop
    #[error("Dependency cycle between operations {operations:?}")]
    DependencyCycle { operations: Vec<usize> },

    /// A backend call failed while replaying under `AbortFrame`
    #[error("Operation {index} ({name}): {source}")]
    Paint {
        index: usize,
        name: &'static str,
        #[source]
        source: PaintError,
    },

    #[error("State serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
