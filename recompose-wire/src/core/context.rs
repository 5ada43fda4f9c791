//! Interfaces the replay side must provide
//!
//! [`RemoteContext`] is the variable table and document state owned by one
//! replay pipeline. [`PaintContext`] is the rendering backend. Every paint
//! operation maps to exactly one `PaintContext` call.

use thiserror::Error;

use crate::core::variables::{Variable, VariableId, VariableSource};
use crate::operations::data::ShaderData;
use crate::operations::paint::PaintBundle;
use crate::operations::protocol::{ClickArea, Header, RootContentBehavior};

/// Document-level state recorded by protocol operations
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentProperty {
    Header(Header),
    Theme(i32),
    RootContentBehavior(RootContentBehavior),
    /// Text variable holding the root content description
    RootContentDescription(VariableId),
    ClickArea(ClickArea),
}

/// Context state mutated by [`Operation::apply`](crate::Operation::apply)
pub trait RemoteContext: VariableSource {
    /// Create or overwrite a variable
    fn load_variable(&mut self, id: VariableId, value: Variable);

    fn set_property(&mut self, property: DocumentProperty);
}

/// A failed backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{call} failed: {message}")]
pub struct PaintError {
    pub call: &'static str,
    pub message: String,
}

impl PaintError {
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

pub type PaintResult = std::result::Result<(), PaintError>;

/// Text run parameters for [`PaintContext::draw_text_run`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub start: i32,
    pub end: i32,
    pub context_start: i32,
    pub context_end: i32,
    pub x: f32,
    pub y: f32,
    pub rtl: bool,
}

/// Rendering backend
///
/// The backend owns its transform stack, clip region, paint state and asset
/// storage (paths, bitmaps, shaders). All values it receives are already
/// resolved.
pub trait PaintContext {
    fn matrix_save(&mut self) -> PaintResult;
    fn matrix_restore(&mut self) -> PaintResult;
    fn matrix_scale(&mut self, scale_x: f32, scale_y: f32, center_x: f32, center_y: f32) -> PaintResult;
    fn matrix_translate(&mut self, dx: f32, dy: f32) -> PaintResult;
    fn matrix_skew(&mut self, skew_x: f32, skew_y: f32) -> PaintResult;
    fn matrix_rotate(&mut self, degrees: f32, center_x: f32, center_y: f32) -> PaintResult;

    fn clip_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> PaintResult;
    fn clip_path(&mut self, path_id: i32, region_op: i32) -> PaintResult;

    fn apply_paint(&mut self, paint: &PaintBundle) -> PaintResult;

    fn load_path(&mut self, path_id: i32, data: &[f32]) -> PaintResult;
    fn load_bitmap(&mut self, bitmap_id: i32, width: u32, height: u32, pixels: &[u8]) -> PaintResult;
    fn load_shader(&mut self, shader: &ShaderData) -> PaintResult;

    fn draw_arc(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        start_angle: f32,
        sweep_angle: f32,
    ) -> PaintResult;
    fn draw_circle(&mut self, center_x: f32, center_y: f32, radius: f32) -> PaintResult;
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> PaintResult;
    fn draw_oval(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> PaintResult;
    fn draw_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> PaintResult;
    fn draw_round_rect(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        radius_x: f32,
        radius_y: f32,
    ) -> PaintResult;
    fn draw_path(&mut self, path_id: i32, start: f32, end: f32) -> PaintResult;
    fn draw_tween_path(
        &mut self,
        path1_id: i32,
        path2_id: i32,
        tween: f32,
        start: f32,
        stop: f32,
    ) -> PaintResult;
    fn draw_text_run(&mut self, run: TextRun<'_>) -> PaintResult;
    fn draw_text_anchored(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        pan_x: f32,
        pan_y: f32,
        flags: u32,
    ) -> PaintResult;
    fn draw_text_on_path(
        &mut self,
        text: &str,
        path_id: i32,
        h_offset: f32,
        v_offset: f32,
    ) -> PaintResult;
    fn draw_bitmap(
        &mut self,
        bitmap_id: i32,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        content_description: i32,
    ) -> PaintResult;
    fn draw_bitmap_int(
        &mut self,
        bitmap_id: i32,
        src: [i32; 4],
        dst: [i32; 4],
        content_description: i32,
    ) -> PaintResult;
}
