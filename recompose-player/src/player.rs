//! Attach, update and replay
//!
//! A frame is three passes over one document:
//! 1. `begin_frame` refreshes the system variables from a [`FrameClock`];
//! 2. `update` walks variable-supporting operations in dependency order,
//!    resolving their references and publishing the variables they produce;
//! 3. `replay` walks every operation in document order, applying it to the
//!    context and issuing its backend call.

use recompose_wire::operations::protocol::check_version;
use recompose_wire::{Document, OpcodeRegistry, PaintContext, PaintError, Resolver, VariableId};
use tracing::{debug, trace, warn};

use crate::config::{PlayerConfig, ReplayFailurePolicy};
use crate::context::{FrameClock, PlayerContext};
use crate::error::{PlayerError, Result};
use crate::graph::DependencyGraph;
use crate::state::{snapshot_from_context, StateSnapshot};

/// A variable reference that did not resolve during the update pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub operation: usize,
    pub name: &'static str,
    pub variable: VariableId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Operations visited
    pub updated: usize,
    pub unresolved: Vec<UnresolvedReference>,
}

impl UpdateReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// A backend call that failed under [`ReplayFailurePolicy::ContinueAndReport`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFailure {
    pub index: usize,
    pub name: &'static str,
    pub error: PaintError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub applied: usize,
    pub painted: usize,
    /// In document order
    pub failures: Vec<ReplayFailure>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub update: UpdateReport,
    pub replay: ReplayReport,
}

/// One document attached to its own context
#[derive(Debug)]
pub struct Player {
    document: Document,
    graph: DependencyGraph,
    context: PlayerContext,
    config: PlayerConfig,
    frames: u64,
}

impl Player {
    /// Check the header and build the dependency graph
    pub fn attach(document: Document, config: PlayerConfig) -> Result<Self> {
        let component_size = match document.header() {
            Some(header) => {
                check_version(header)?;
                (header.width as f32, header.height as f32)
            }
            None => config.window_size.unwrap_or_default(),
        };
        let window_size = config.window_size.unwrap_or(component_size);
        let graph = DependencyGraph::build(&document)?;
        debug!(
            operations = document.len(),
            graph_nodes = graph.node_count(),
            ?window_size,
            ?component_size,
            "document attached"
        );
        Ok(Self {
            document,
            graph,
            context: PlayerContext::new(window_size, component_size),
            config,
            frames: 0,
        })
    }

    /// Decode with the configured options, then attach
    pub fn decode(bytes: &[u8], registry: &OpcodeRegistry, config: PlayerConfig) -> Result<Self> {
        let document = Document::decode_with(bytes, registry, &config.decode)?;
        Self::attach(document, config)
    }

    pub fn begin_frame(&mut self, clock: &FrameClock) {
        self.context.begin_frame(clock);
    }

    /// Resolve every variable-bound parameter and publish produced variables
    ///
    /// Unresolved references keep their previous cached value and are
    /// reported, never raised.
    pub fn update(&mut self) -> UpdateReport {
        let mut report = UpdateReport::default();
        let operations = self.document.operations_mut();
        for &index in self.graph.update_order() {
            let operation = &mut operations[index];
            let name = operation.name();
            if let Some(support) = operation.variable_support_mut() {
                let mut resolver = Resolver::new(&self.context);
                support.update_variables(&mut resolver);
                for variable in resolver.into_unresolved() {
                    warn!(
                        operation = index,
                        kind = name,
                        variable,
                        "unresolved variable, keeping previous value"
                    );
                    report.unresolved.push(UnresolvedReference {
                        operation: index,
                        name,
                        variable,
                    });
                }
            }
            if self.graph.is_producer(index) {
                operation.apply(&mut self.context);
            }
            report.updated += 1;
        }
        report
    }

    /// Apply and paint every operation in document order
    pub fn replay(&mut self, canvas: &mut dyn PaintContext) -> Result<ReplayReport> {
        let mut report = ReplayReport::default();
        for (index, operation) in self.document.iter().enumerate() {
            operation.apply(&mut self.context);
            report.applied += 1;
            if !operation.is_paint() {
                continue;
            }
            trace!(index, kind = operation.name(), "paint");
            let Err(error) = operation.paint(canvas) else {
                report.painted += 1;
                continue;
            };
            let name = operation.name();
            warn!(index, kind = name, %error, "backend call failed");
            match self.config.failure_policy {
                ReplayFailurePolicy::AbortFrame => {
                    return Err(PlayerError::Paint {
                        index,
                        name,
                        source: error,
                    })
                }
                ReplayFailurePolicy::ContinueAndReport => {
                    report.failures.push(ReplayFailure { index, name, error })
                }
            }
        }
        Ok(report)
    }

    /// `begin_frame`, `update` and `replay` for one frame
    pub fn frame(&mut self, clock: &FrameClock, canvas: &mut dyn PaintContext) -> Result<FrameReport> {
        self.begin_frame(clock);
        let update = self.update();
        let replay = self.replay(canvas)?;
        let frame = self.frames;
        self.frames += 1;
        debug!(
            frame,
            painted = replay.painted,
            failures = replay.failures.len(),
            unresolved = update.unresolved.len(),
            "frame complete"
        );
        Ok(FrameReport {
            frame,
            update,
            replay,
        })
    }

    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.context.set_window_size(width, height);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn context(&self) -> &PlayerContext {
        &self.context
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Frames completed by [`frame`](Self::frame)
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn snapshot(&self) -> StateSnapshot {
        snapshot_from_context(&self.context, self.frames)
    }
}
