//! Draw operations that reference assets or text

use std::fmt;

use bitflags::bitflags;

use crate::core::buffer::WireBuffer;
use crate::core::context::{PaintContext, PaintResult, TextRun};
use crate::core::opcodes::Opcode;
use crate::core::operation::{
    operation_identity, variable_support, Decode, DependencyRegistrar, Operation, VariableSupport,
};
use crate::core::reader::WireReader;
use crate::core::registry::RecordShape;
use crate::core::variables::{FloatSlot, Resolver, TextSlot, VariableId};
use crate::error::{Result, WireError};
use crate::operations::read_variable_id;

/// Combine the clip with a declared path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipPath {
    pub path_id: i32,
    pub region_op: i32,
}

impl ClipPath {
    pub const DIFFERENCE: i32 = 0;
    pub const INTERSECT: i32 = 1;
    pub const UNION: i32 = 2;
    pub const XOR: i32 = 3;
    pub const REVERSE_DIFFERENCE: i32 = 4;
    pub const REPLACE: i32 = 5;

    pub fn new(path_id: i32, region_op: i32) -> Self {
        Self { path_id, region_op }
    }
}

impl Decode for ClipPath {
    const OPCODE: u32 = Opcode::CLIP_PATH.raw();
    const NAME: &'static str = "ClipPath";
    const SHAPE: RecordShape = RecordShape::Fixed(8);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let path_id = reader.read_i32()?;
        let region_op = reader.read_i32()?;
        if !(Self::DIFFERENCE..=Self::REPLACE).contains(&region_op) {
            return Err(WireError::InvalidField {
                operation: Self::NAME,
                field: "region op",
                value: i64::from(region_op),
            });
        }
        Ok(Self::new(path_id, region_op))
    }
}

impl Operation for ClipPath {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_i32(self.path_id);
        buffer.write_i32(self.region_op);
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.clip_path(self.path_id, self.region_op)
    }
}

impl fmt::Display for ClipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClipPath {} op {}", self.path_id, self.region_op)
    }
}

/// Stroke or fill a declared path between two fractions of its length
#[derive(Debug, Clone, PartialEq)]
pub struct DrawPath {
    pub path_id: i32,
    pub start: FloatSlot,
    pub end: FloatSlot,
}

impl DrawPath {
    pub fn new(path_id: i32, start: f32, end: f32) -> Self {
        Self {
            path_id,
            start: start.into(),
            end: end.into(),
        }
    }

    /// The whole path
    pub fn full(path_id: i32) -> Self {
        Self::new(path_id, 0.0, 1.0)
    }
}

impl Decode for DrawPath {
    const OPCODE: u32 = Opcode::DRAW_PATH.raw();
    const NAME: &'static str = "DrawPath";
    const SHAPE: RecordShape = RecordShape::Fixed(12);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            path_id: reader.read_i32()?,
            start: reader.read_f32()?.into(),
            end: reader.read_f32()?.into(),
        })
    }
}

impl Operation for DrawPath {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_i32(self.path_id);
        buffer.write_f32(self.start.raw());
        buffer.write_f32(self.end.raw());
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.draw_path(self.path_id, self.start.get(), self.end.get())
    }
}

impl VariableSupport for DrawPath {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.start.register(registrar);
        self.end.register(registrar);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.start.update(resolver);
        self.end.update(resolver);
    }
}

impl fmt::Display for DrawPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DrawPath [{}], {}, {}", self.path_id, self.start, self.end)
    }
}

/// Draw an interpolation between two declared paths
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTweenPath {
    pub path1_id: i32,
    pub path2_id: i32,
    pub tween: FloatSlot,
    pub start: FloatSlot,
    pub stop: FloatSlot,
}

impl DrawTweenPath {
    pub fn new(path1_id: i32, path2_id: i32, tween: f32, start: f32, stop: f32) -> Self {
        Self {
            path1_id,
            path2_id,
            tween: tween.into(),
            start: start.into(),
            stop: stop.into(),
        }
    }
}

impl Decode for DrawTweenPath {
    const OPCODE: u32 = Opcode::DRAW_TWEEN_PATH.raw();
    const NAME: &'static str = "DrawTweenPath";
    const SHAPE: RecordShape = RecordShape::Fixed(20);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            path1_id: reader.read_i32()?,
            path2_id: reader.read_i32()?,
            tween: reader.read_f32()?.into(),
            start: reader.read_f32()?.into(),
            stop: reader.read_f32()?.into(),
        })
    }
}

impl Operation for DrawTweenPath {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_i32(self.path1_id);
        buffer.write_i32(self.path2_id);
        buffer.write_f32(self.tween.raw());
        buffer.write_f32(self.start.raw());
        buffer.write_f32(self.stop.raw());
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.draw_tween_path(
            self.path1_id,
            self.path2_id,
            self.tween.get(),
            self.start.get(),
            self.stop.get(),
        )
    }
}

impl VariableSupport for DrawTweenPath {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.tween.register(registrar);
        self.start.register(registrar);
        self.stop.register(registrar);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.tween.update(resolver);
        self.start.update(resolver);
        self.stop.update(resolver);
    }
}

impl fmt::Display for DrawTweenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DrawTweenPath [{}] [{}] {}, {}, {}",
            self.path1_id, self.path2_id, self.tween, self.start, self.stop
        )
    }
}

/// Draw a range of a text variable at a position
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTextRun {
    pub text: TextSlot,
    pub start: i32,
    pub end: i32,
    pub context_start: i32,
    pub context_end: i32,
    pub x: FloatSlot,
    pub y: FloatSlot,
    pub rtl: bool,
}

impl DrawTextRun {
    /// Draw the whole text; `end == -1` means up to the end of the text
    pub fn new(text_id: VariableId, x: f32, y: f32) -> Self {
        Self {
            text: TextSlot::new(text_id),
            start: 0,
            end: -1,
            context_start: 0,
            context_end: -1,
            x: x.into(),
            y: y.into(),
            rtl: false,
        }
    }
}

impl Decode for DrawTextRun {
    const OPCODE: u32 = Opcode::DRAW_TEXT_RUN.raw();
    const NAME: &'static str = "DrawTextRun";
    const SHAPE: RecordShape = RecordShape::Fixed(29);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            text: TextSlot::new(read_variable_id(reader, Self::NAME, "text id")?),
            start: reader.read_i32()?,
            end: reader.read_i32()?,
            context_start: reader.read_i32()?,
            context_end: reader.read_i32()?,
            x: reader.read_f32()?.into(),
            y: reader.read_f32()?.into(),
            rtl: reader.read_bool()?,
        })
    }
}

impl Operation for DrawTextRun {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.text.id());
        buffer.write_i32(self.start);
        buffer.write_i32(self.end);
        buffer.write_i32(self.context_start);
        buffer.write_i32(self.context_end);
        buffer.write_f32(self.x.raw());
        buffer.write_f32(self.y.raw());
        buffer.write_bool(self.rtl);
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.draw_text_run(TextRun {
            text: self.text.get(),
            start: self.start,
            end: self.end,
            context_start: self.context_start,
            context_end: self.context_end,
            x: self.x.get(),
            y: self.y.get(),
            rtl: self.rtl,
        })
    }
}

impl VariableSupport for DrawTextRun {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.text.register(registrar);
        self.x.register(registrar);
        self.y.register(registrar);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.text.update(resolver);
        self.x.update(resolver);
        self.y.update(resolver);
    }
}

impl fmt::Display for DrawTextRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DrawTextRun {} <{}, {}> {}, {}",
            self.text, self.start, self.end, self.x, self.y
        )
    }
}

bitflags! {
    /// Flags of an anchored text draw
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AnchorFlags: u32 {
        const RTL = 1;
        /// Measure with monospace advances
        const MONOSPACE_MEASURE = 2;
    }
}

/// Draw text positioned relative to an anchor point
///
/// `pan_x` and `pan_y` range over `[-1, 1]`: -1 puts the anchor at the start
/// (left/top) edge of the text bounds, 1 at the end edge.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTextAnchored {
    pub text: TextSlot,
    pub x: FloatSlot,
    pub y: FloatSlot,
    pub pan_x: FloatSlot,
    pub pan_y: FloatSlot,
    pub flags: AnchorFlags,
}

impl DrawTextAnchored {
    pub fn new(text_id: VariableId, x: f32, y: f32, pan_x: f32, pan_y: f32, flags: AnchorFlags) -> Self {
        Self {
            text: TextSlot::new(text_id),
            x: x.into(),
            y: y.into(),
            pan_x: pan_x.into(),
            pan_y: pan_y.into(),
            flags,
        }
    }
}

impl Decode for DrawTextAnchored {
    const OPCODE: u32 = Opcode::DRAW_TEXT_ANCHOR.raw();
    const NAME: &'static str = "DrawTextAnchored";
    const SHAPE: RecordShape = RecordShape::Fixed(24);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let text = TextSlot::new(read_variable_id(reader, Self::NAME, "text id")?);
        let x = reader.read_f32()?.into();
        let y = reader.read_f32()?.into();
        let pan_x = reader.read_f32()?.into();
        let pan_y = reader.read_f32()?.into();
        let bits = reader.read_u32()?;
        let flags = AnchorFlags::from_bits(bits).ok_or(WireError::InvalidField {
            operation: Self::NAME,
            field: "flags",
            value: i64::from(bits),
        })?;
        Ok(Self {
            text,
            x,
            y,
            pan_x,
            pan_y,
            flags,
        })
    }
}

impl Operation for DrawTextAnchored {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.text.id());
        buffer.write_f32(self.x.raw());
        buffer.write_f32(self.y.raw());
        buffer.write_f32(self.pan_x.raw());
        buffer.write_f32(self.pan_y.raw());
        buffer.write_u32(self.flags.bits());
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.draw_text_anchored(
            self.text.get(),
            self.x.get(),
            self.y.get(),
            self.pan_x.get(),
            self.pan_y.get(),
            self.flags.bits(),
        )
    }
}

impl VariableSupport for DrawTextAnchored {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.text.register(registrar);
        self.x.register(registrar);
        self.y.register(registrar);
        self.pan_x.register(registrar);
        self.pan_y.register(registrar);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.text.update(resolver);
        self.x.update(resolver);
        self.y.update(resolver);
        self.pan_x.update(resolver);
        self.pan_y.update(resolver);
    }
}

impl fmt::Display for DrawTextAnchored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DrawTextAnchored {} {}, {} pan {}, {} flags {:#x}",
            self.text,
            self.x,
            self.y,
            self.pan_x,
            self.pan_y,
            self.flags.bits()
        )
    }
}

/// Draw text along a declared path
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTextOnPath {
    pub text: TextSlot,
    pub path_id: i32,
    pub h_offset: FloatSlot,
    pub v_offset: FloatSlot,
}

impl DrawTextOnPath {
    pub fn new(text_id: VariableId, path_id: i32, h_offset: f32, v_offset: f32) -> Self {
        Self {
            text: TextSlot::new(text_id),
            path_id,
            h_offset: h_offset.into(),
            v_offset: v_offset.into(),
        }
    }
}

impl Decode for DrawTextOnPath {
    const OPCODE: u32 = Opcode::DRAW_TEXT_ON_PATH.raw();
    const NAME: &'static str = "DrawTextOnPath";
    const SHAPE: RecordShape = RecordShape::Fixed(16);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            text: TextSlot::new(read_variable_id(reader, Self::NAME, "text id")?),
            path_id: reader.read_i32()?,
            h_offset: reader.read_f32()?.into(),
            v_offset: reader.read_f32()?.into(),
        })
    }
}

impl Operation for DrawTextOnPath {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.text.id());
        buffer.write_i32(self.path_id);
        buffer.write_f32(self.h_offset.raw());
        buffer.write_f32(self.v_offset.raw());
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.draw_text_on_path(
            self.text.get(),
            self.path_id,
            self.h_offset.get(),
            self.v_offset.get(),
        )
    }
}

impl VariableSupport for DrawTextOnPath {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.text.register(registrar);
        self.h_offset.register(registrar);
        self.v_offset.register(registrar);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.text.update(resolver);
        self.h_offset.update(resolver);
        self.v_offset.update(resolver);
    }
}

impl fmt::Display for DrawTextOnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DrawTextOnPath {} [{}] {}, {}",
            self.text, self.path_id, self.h_offset, self.v_offset
        )
    }
}

/// Draw a declared bitmap into a float destination rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBitmap {
    pub bitmap_id: i32,
    pub left: FloatSlot,
    pub top: FloatSlot,
    pub right: FloatSlot,
    pub bottom: FloatSlot,
    /// Text variable describing the image, 0 when absent
    pub content_description: i32,
}

impl DrawBitmap {
    pub fn new(
        bitmap_id: i32,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        content_description: i32,
    ) -> Self {
        Self {
            bitmap_id,
            left: left.into(),
            top: top.into(),
            right: right.into(),
            bottom: bottom.into(),
            content_description,
        }
    }
}

impl Decode for DrawBitmap {
    const OPCODE: u32 = Opcode::DRAW_BITMAP.raw();
    const NAME: &'static str = "DrawBitmap";
    const SHAPE: RecordShape = RecordShape::Fixed(24);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            bitmap_id: reader.read_i32()?,
            left: reader.read_f32()?.into(),
            top: reader.read_f32()?.into(),
            right: reader.read_f32()?.into(),
            bottom: reader.read_f32()?.into(),
            content_description: reader.read_i32()?,
        })
    }
}

impl Operation for DrawBitmap {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_i32(self.bitmap_id);
        buffer.write_f32(self.left.raw());
        buffer.write_f32(self.top.raw());
        buffer.write_f32(self.right.raw());
        buffer.write_f32(self.bottom.raw());
        buffer.write_i32(self.content_description);
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.draw_bitmap(
            self.bitmap_id,
            self.left.get(),
            self.top.get(),
            self.right.get(),
            self.bottom.get(),
            self.content_description,
        )
    }
}

impl VariableSupport for DrawBitmap {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.left.register(registrar);
        self.top.register(registrar);
        self.right.register(registrar);
        self.bottom.register(registrar);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.left.update(resolver);
        self.top.update(resolver);
        self.right.update(resolver);
        self.bottom.update(resolver);
    }
}

impl fmt::Display for DrawBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DrawBitmap [{}] {}, {}, {}, {}",
            self.bitmap_id, self.left, self.top, self.right, self.bottom
        )
    }
}

/// Draw a source rectangle of a declared bitmap into an integer destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawBitmapInt {
    pub bitmap_id: i32,
    /// left, top, right, bottom
    pub src: [i32; 4],
    pub dst: [i32; 4],
    pub content_description: i32,
}

impl DrawBitmapInt {
    pub fn new(bitmap_id: i32, src: [i32; 4], dst: [i32; 4], content_description: i32) -> Self {
        Self {
            bitmap_id,
            src,
            dst,
            content_description,
        }
    }
}

fn read_rect(reader: &mut WireReader<'_>) -> Result<[i32; 4]> {
    Ok([
        reader.read_i32()?,
        reader.read_i32()?,
        reader.read_i32()?,
        reader.read_i32()?,
    ])
}

impl Decode for DrawBitmapInt {
    const OPCODE: u32 = Opcode::DRAW_BITMAP_INT.raw();
    const NAME: &'static str = "DrawBitmapInt";
    const SHAPE: RecordShape = RecordShape::Fixed(40);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let bitmap_id = reader.read_i32()?;
        let src = read_rect(reader)?;
        let dst = read_rect(reader)?;
        let content_description = reader.read_i32()?;
        Ok(Self::new(bitmap_id, src, dst, content_description))
    }
}

impl Operation for DrawBitmapInt {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_i32(self.bitmap_id);
        self.src.iter().chain(&self.dst).for_each(|v| buffer.write_i32(*v));
        buffer.write_i32(self.content_description);
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.draw_bitmap_int(self.bitmap_id, self.src, self.dst, self.content_description)
    }
}

impl fmt::Display for DrawBitmapInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DrawBitmapInt [{}] {:?} -> {:?}",
            self.bitmap_id, self.src, self.dst
        )
    }
}
