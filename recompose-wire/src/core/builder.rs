//! Encoding side: builds a document record by record
//!
//! The builder owns a [`WireBuffer`] and an id allocator. Variables declared
//! through it get ids from [`FIRST_USER_ID`] upward, so they never collide
//! with the context's system variables.

use crate::core::buffer::WireBuffer;
use crate::core::operation::Operation;
use crate::core::reader::{MAX_BLOB_SIZE, MAX_STRING_SIZE};
use crate::core::variables::{as_nan, ColorSlot, VariableId, FIRST_USER_ID, OPERATOR_BASE};
use crate::error::{Result, WireError};
use crate::operations::{
    AnchorFlags, BitmapData, ClickArea, ClipPath, ClipRect, ColorExpression, DrawArc, DrawBitmap,
    DrawBitmapInt, DrawCircle, DrawLine, DrawOval, DrawPath, DrawRect, DrawRoundRect,
    DrawTextAnchored, DrawTextOnPath, DrawTextRun, DrawTweenPath, FloatConstant, FloatExpression,
    Header, MatrixRestore, MatrixRotate, MatrixSave, MatrixScale, MatrixSkew, MatrixTranslate,
    PaintBundle, PaintData, PathData, RootContentBehavior, RootContentDescription, ShaderData,
    ShaderUniform, TextData, TextFromFloat, TextMerge, Theme,
};

#[derive(Debug)]
pub struct DocumentBuilder {
    buffer: WireBuffer,
    next_id: VariableId,
}

/// Refuse payloads the default decoder would reject
fn check_length(kind: &'static str, length: usize, limit: usize) -> Result<()> {
    if length > limit {
        return Err(WireError::LimitExceeded {
            kind,
            length,
            limit,
        });
    }
    Ok(())
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self {
            buffer: WireBuffer::new(),
            next_id: FIRST_USER_ID,
        }
    }

    /// Reserve a fresh variable or asset id
    pub fn allocate_id(&mut self) -> Result<VariableId> {
        let id = self.next_id;
        if id >= OPERATOR_BASE {
            return Err(WireError::LimitExceeded {
                kind: "variable id",
                length: id as usize,
                limit: OPERATOR_BASE as usize - 1,
            });
        }
        self.next_id += 1;
        Ok(id)
    }

    /// Append any operation, including application-defined kinds
    pub fn push(&mut self, operation: &dyn Operation) -> &mut Self {
        operation.write(&mut self.buffer);
        self
    }

    /// Leading metadata record for the current format version
    pub fn header(&mut self, width: u32, height: u32, capabilities: u64) -> &mut Self {
        self.push(&Header::new(width, height, capabilities))
    }

    pub fn set_theme(&mut self, theme: i32) -> &mut Self {
        self.push(&Theme::new(theme))
    }

    pub fn set_root_content_behavior(
        &mut self,
        scroll: i32,
        alignment: i32,
        sizing: i32,
        mode: i32,
    ) -> &mut Self {
        self.push(&RootContentBehavior::new(scroll, alignment, sizing, mode))
    }

    pub fn set_root_content_description(&mut self, description: &str) -> Result<&mut Self> {
        let id = self.add_text(description)?;
        Ok(self.push(&RootContentDescription::new(id)))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_click_area(
        &mut self,
        id: i32,
        content_description: Option<&str>,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        metadata: Option<&str>,
    ) -> Result<&mut Self> {
        let description_id = content_description
            .map(|text| self.add_text(text))
            .transpose()?
            .unwrap_or(0);
        let metadata_id = metadata
            .map(|text| self.add_text(text))
            .transpose()?
            .unwrap_or(0);
        Ok(self.push(&ClickArea::new(
            id,
            description_id,
            left,
            top,
            right,
            bottom,
            metadata_id,
        )))
    }

    /// Declare a text variable
    pub fn add_text(&mut self, text: &str) -> Result<VariableId> {
        check_length("string", text.len(), MAX_STRING_SIZE)?;
        let id = self.allocate_id()?;
        self.push(&TextData::new(id, text));
        Ok(id)
    }

    /// Declare a float variable; returns the NaN reference to pass as a parameter
    pub fn add_float(&mut self, value: f32) -> Result<f32> {
        let id = self.allocate_id()?;
        self.push(&FloatConstant::new(id, value));
        Ok(as_nan(id))
    }

    /// Declare a float computed from a reverse-polish expression; returns its reference
    pub fn add_float_expression(&mut self, expression: &[f32]) -> Result<f32> {
        let id = self.allocate_id()?;
        let op = FloatExpression::new(id, expression.to_vec())?;
        self.push(&op);
        Ok(as_nan(id))
    }

    /// Declare a color interpolated between two colors
    pub fn add_color_expression(
        &mut self,
        from: ColorSlot,
        to: ColorSlot,
        tween: f32,
    ) -> Result<VariableId> {
        let id = self.allocate_id()?;
        self.push(&ColorExpression::new(id, from, to, tween));
        Ok(id)
    }

    /// Declare a text variable formatting `value`
    pub fn text_from_float(
        &mut self,
        value: f32,
        digits_before: u16,
        digits_after: u16,
        flags: u32,
    ) -> Result<VariableId> {
        let id = self.allocate_id()?;
        self.push(&TextFromFloat::new(id, value, digits_before, digits_after, flags));
        Ok(id)
    }

    /// Declare a text variable concatenating two others
    pub fn text_merge(&mut self, first: VariableId, second: VariableId) -> Result<VariableId> {
        let id = self.allocate_id()?;
        self.push(&TextMerge::new(id, first, second));
        Ok(id)
    }

    pub fn add_path_data(&mut self, data: &[f32]) -> Result<i32> {
        let id = self.allocate_asset_id()?;
        self.push(&PathData::new(id, data.to_vec()));
        Ok(id)
    }

    pub fn add_bitmap_data(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<i32> {
        check_length("blob", pixels.len(), MAX_BLOB_SIZE)?;
        let id = self.allocate_asset_id()?;
        self.push(&BitmapData::new(id, width, height, pixels.to_vec()));
        Ok(id)
    }

    /// Declare a runtime shader; the source is stored as a text variable
    pub fn add_shader(&mut self, source: &str, uniforms: Vec<ShaderUniform>) -> Result<i32> {
        for uniform in &uniforms {
            check_length("string", uniform.name().len(), MAX_STRING_SIZE)?;
        }
        let source_id = self.add_text(source)?;
        let id = self.allocate_asset_id()?;
        self.push(&ShaderData::new(id, source_id, uniforms));
        Ok(id)
    }

    fn allocate_asset_id(&mut self) -> Result<i32> {
        // Ids stay below OPERATOR_BASE, so they always fit
        Ok(self.allocate_id()? as i32)
    }

    pub fn add_paint(&mut self, bundle: &PaintBundle) -> &mut Self {
        self.push(&PaintData::new(bundle.clone()))
    }

    pub fn clip_path(&mut self, path_id: i32, region_op: i32) -> &mut Self {
        self.push(&ClipPath::new(path_id, region_op))
    }

    pub fn clip_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> &mut Self {
        self.push(&ClipRect::new(left, top, right, bottom))
    }

    pub fn matrix_save(&mut self) -> &mut Self {
        self.push(&MatrixSave::new())
    }

    pub fn matrix_restore(&mut self) -> &mut Self {
        self.push(&MatrixRestore::new())
    }

    pub fn matrix_scale(&mut self, scale_x: f32, scale_y: f32, center_x: f32, center_y: f32) -> &mut Self {
        self.push(&MatrixScale::new(scale_x, scale_y, center_x, center_y))
    }

    pub fn matrix_translate(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.push(&MatrixTranslate::new(dx, dy))
    }

    pub fn matrix_skew(&mut self, skew_x: f32, skew_y: f32) -> &mut Self {
        self.push(&MatrixSkew::new(skew_x, skew_y))
    }

    pub fn matrix_rotate(&mut self, degrees: f32, center_x: f32, center_y: f32) -> &mut Self {
        self.push(&MatrixRotate::new(degrees, center_x, center_y))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_arc(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        start_angle: f32,
        sweep_angle: f32,
    ) -> &mut Self {
        self.push(&DrawArc::new(left, top, right, bottom, start_angle, sweep_angle))
    }

    pub fn draw_circle(&mut self, center_x: f32, center_y: f32, radius: f32) -> &mut Self {
        self.push(&DrawCircle::new(center_x, center_y, radius))
    }

    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.push(&DrawLine::new(x1, y1, x2, y2))
    }

    pub fn draw_oval(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> &mut Self {
        self.push(&DrawOval::new(left, top, right, bottom))
    }

    pub fn draw_rect(&mut self, left: f32, top: f32, right: f32, bottom: f32) -> &mut Self {
        self.push(&DrawRect::new(left, top, right, bottom))
    }

    pub fn draw_round_rect(
        &mut self,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        radius_x: f32,
        radius_y: f32,
    ) -> &mut Self {
        self.push(&DrawRoundRect::new(left, top, right, bottom, radius_x, radius_y))
    }

    pub fn draw_path(&mut self, path_id: i32, start: f32, end: f32) -> &mut Self {
        self.push(&DrawPath::new(path_id, start, end))
    }

    pub fn draw_tween_path(
        &mut self,
        path1_id: i32,
        path2_id: i32,
        tween: f32,
        start: f32,
        stop: f32,
    ) -> &mut Self {
        self.push(&DrawTweenPath::new(path1_id, path2_id, tween, start, stop))
    }

    /// Draw a whole text variable at `(x, y)`
    pub fn draw_text_run(&mut self, text_id: VariableId, x: f32, y: f32) -> &mut Self {
        self.push(&DrawTextRun::new(text_id, x, y))
    }

    pub fn draw_text_anchored(
        &mut self,
        text_id: VariableId,
        x: f32,
        y: f32,
        pan_x: f32,
        pan_y: f32,
        flags: AnchorFlags,
    ) -> &mut Self {
        self.push(&DrawTextAnchored::new(text_id, x, y, pan_x, pan_y, flags))
    }

    pub fn draw_text_on_path(
        &mut self,
        text_id: VariableId,
        path_id: i32,
        h_offset: f32,
        v_offset: f32,
    ) -> &mut Self {
        self.push(&DrawTextOnPath::new(text_id, path_id, h_offset, v_offset))
    }

    pub fn draw_bitmap(
        &mut self,
        bitmap_id: i32,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        content_description: i32,
    ) -> &mut Self {
        self.push(&DrawBitmap::new(bitmap_id, left, top, right, bottom, content_description))
    }

    pub fn draw_bitmap_int(
        &mut self,
        bitmap_id: i32,
        src: [i32; 4],
        dst: [i32; 4],
        content_description: i32,
    ) -> &mut Self {
        self.push(&DrawBitmapInt::new(bitmap_id, src, dst, content_description))
    }

    /// Records written so far
    pub fn record_count(&self) -> usize {
        self.buffer.record_count()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buffer.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Document;
    use crate::core::registry::OpcodeRegistry;
    use crate::core::variables::variable_from_nan;
    use crate::operations::MathOperator;

    #[test]
    fn test_ids_start_after_system_range() {
        let mut builder = DocumentBuilder::new();
        let text = builder.add_text("a").unwrap();
        let float = builder.add_float(1.0).unwrap();
        assert_eq!(text, FIRST_USER_ID);
        assert_eq!(variable_from_nan(float), Some(FIRST_USER_ID + 1));
    }

    #[test]
    fn test_builder_output_decodes() {
        let mut builder = DocumentBuilder::new();
        builder.header(100, 100, 0);
        let radius = builder
            .add_float_expression(&[4.0, 2.0, MathOperator::Mul.as_float()])
            .unwrap();
        builder
            .matrix_save()
            .draw_circle(50.0, 50.0, radius)
            .matrix_restore();
        let records = builder.record_count();
        let bytes = builder.finish();

        let registry = OpcodeRegistry::standard().unwrap();
        let document = Document::decode(&bytes, &registry).unwrap();
        assert_eq!(document.len(), records);
        assert_eq!(document.header().map(|h| h.width), Some(100));
    }

    #[test]
    fn test_string_limit_matches_decoder() {
        let registry = OpcodeRegistry::standard().unwrap();
        let mut builder = DocumentBuilder::new();
        builder.add_text(&"x".repeat(MAX_STRING_SIZE)).unwrap();
        let err = builder.add_text(&"x".repeat(MAX_STRING_SIZE + 1)).unwrap_err();
        assert!(matches!(
            err,
            WireError::LimitExceeded {
                kind: "string",
                length: 4001,
                limit: 4000,
            }
        ));
        assert!(builder.set_root_content_description(&"d".repeat(5000)).is_err());
        assert!(builder
            .add_click_area(1, None, 0.0, 0.0, 1.0, 1.0, Some("m".repeat(5000).as_str()))
            .is_err());
        assert!(builder
            .add_shader("src", vec![ShaderUniform::int("n".repeat(5000), &[1])])
            .is_err());

        // Rejected calls write nothing, so the output still decodes
        assert_eq!(builder.record_count(), 1);
        let document = Document::decode(&builder.finish(), &registry).unwrap();
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn test_blob_limit_matches_decoder() {
        let mut builder = DocumentBuilder::new();
        let err = builder
            .add_bitmap_data(1, 1, &vec![0; MAX_BLOB_SIZE + 1])
            .unwrap_err();
        assert!(matches!(err, WireError::LimitExceeded { kind: "blob", .. }));
        assert_eq!(builder.record_count(), 0);
    }

    #[test]
    fn test_invalid_expression_rejected() {
        let mut builder = DocumentBuilder::new();
        assert!(builder.add_float_expression(&[MathOperator::Add.as_float()]).is_err());
    }
}
