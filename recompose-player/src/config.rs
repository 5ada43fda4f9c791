//! Player configuration

use recompose_wire::DecodeOptions;

/// What the replay pass does when a backend call fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplayFailurePolicy {
    /// Skip the rest of the frame and return the error
    #[default]
    AbortFrame,
    /// Attempt every operation and collect failures in the report
    ContinueAndReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerConfig {
    pub decode: DecodeOptions,
    pub failure_policy: ReplayFailurePolicy,
    /// Host window size; defaults to the document header's size
    pub window_size: Option<(f32, f32)>,
}

impl PlayerConfig {
    pub fn with_decode_options(mut self, decode: DecodeOptions) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_failure_policy(mut self, policy: ReplayFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_window_size(mut self, width: f32, height: f32) -> Self {
        self.window_size = Some((width, height));
        self
    }
}
