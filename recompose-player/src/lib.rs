//! Recompose player
//!
//! Owns everything that happens after a [`Document`](recompose_wire::Document)
//! is decoded: the variable table and document properties
//! ([`PlayerContext`]), the dependency graph built at attach time
//! ([`DependencyGraph`]), and the per-frame update and replay passes
//! ([`Player`]).
//!
//! [`RecordingCanvas`] is a backend that records every call it receives, for
//! tests and for the shell's replay listing.

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod player;
pub mod recorder;
pub mod state;

pub use config::{PlayerConfig, ReplayFailurePolicy};
pub use context::{DocumentProperties, FrameClock, PlayerContext};
pub use error::{PlayerError, Result};
pub use graph::DependencyGraph;
pub use player::{
    FrameReport, Player, ReplayFailure, ReplayReport, UnresolvedReference, UpdateReport,
};
pub use recorder::{PaintCall, RecordingCanvas};
pub use state::{
    deserialize_state_from_json, serialize_state_to_json, snapshot_from_context, StateSnapshot,
    VariableValue,
};
