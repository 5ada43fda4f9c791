//! Paint attribute changes
//!
//! A [`PaintBundle`] is an ordered list of attribute changes applied to the
//! backend's current paint in one call. Float attributes may be variable
//! references; the color may reference a color variable.

use std::fmt;

use crate::core::buffer::WireBuffer;
use crate::core::context::{PaintContext, PaintResult};
use crate::core::opcodes::Opcode;
use crate::core::operation::{
    operation_identity, variable_support, Decode, DependencyRegistrar, Operation, VariableSupport,
};
use crate::core::reader::WireReader;
use crate::core::registry::RecordShape;
use crate::core::variables::{ColorSlot, FloatSlot, Resolver};
use crate::error::{Result, WireError};
use crate::operations::check_variable_id;

/// One paint attribute change
#[derive(Debug, Clone, PartialEq)]
pub enum PaintChange {
    TextSize(FloatSlot),
    Color(ColorSlot),
    StrokeWidth(FloatSlot),
    StrokeMiter(FloatSlot),
    StrokeCap(i32),
    Style(i32),
    Shader(i32),
    FilterQuality(i32),
    Alpha(FloatSlot),
    ColorFilter { color: u32, mode: i32 },
    AntiAlias(bool),
    StrokeJoin(i32),
    Typeface { font: i32, weight: i32, italic: bool },
    FilterBitmap(bool),
    BlendMode(i32),
}

mod tag {
    pub const TEXT_SIZE: u32 = 1;
    pub const COLOR: u32 = 4;
    pub const COLOR_ID: u32 = 5;
    pub const STROKE_WIDTH: u32 = 6;
    pub const STROKE_MITER: u32 = 7;
    pub const STROKE_CAP: u32 = 8;
    pub const STYLE: u32 = 9;
    pub const SHADER: u32 = 10;
    pub const FILTER_QUALITY: u32 = 11;
    pub const ALPHA: u32 = 13;
    pub const COLOR_FILTER: u32 = 14;
    pub const ANTI_ALIAS: u32 = 15;
    pub const STROKE_JOIN: u32 = 16;
    pub const TYPEFACE: u32 = 17;
    pub const FILTER_BITMAP: u32 = 18;
    pub const BLEND_MODE: u32 = 19;
}

impl PaintChange {
    pub const STYLE_FILL: i32 = 0;
    pub const STYLE_STROKE: i32 = 1;
    pub const STYLE_FILL_AND_STROKE: i32 = 2;

    pub const CAP_BUTT: i32 = 0;
    pub const CAP_ROUND: i32 = 1;
    pub const CAP_SQUARE: i32 = 2;

    fn write(&self, buffer: &mut WireBuffer) {
        match self {
            PaintChange::TextSize(v) => write_float(buffer, tag::TEXT_SIZE, v),
            PaintChange::Color(color) => match color.variable_id() {
                Some(id) => {
                    buffer.write_u32(tag::COLOR_ID);
                    buffer.write_u32(id);
                }
                None => {
                    buffer.write_u32(tag::COLOR);
                    buffer.write_u32(color.get());
                }
            },
            PaintChange::StrokeWidth(v) => write_float(buffer, tag::STROKE_WIDTH, v),
            PaintChange::StrokeMiter(v) => write_float(buffer, tag::STROKE_MITER, v),
            PaintChange::StrokeCap(v) => write_int(buffer, tag::STROKE_CAP, *v),
            PaintChange::Style(v) => write_int(buffer, tag::STYLE, *v),
            PaintChange::Shader(v) => write_int(buffer, tag::SHADER, *v),
            PaintChange::FilterQuality(v) => write_int(buffer, tag::FILTER_QUALITY, *v),
            PaintChange::Alpha(v) => write_float(buffer, tag::ALPHA, v),
            PaintChange::ColorFilter { color, mode } => {
                buffer.write_u32(tag::COLOR_FILTER);
                buffer.write_u32(*color);
                buffer.write_i32(*mode);
            }
            PaintChange::AntiAlias(v) => {
                buffer.write_u32(tag::ANTI_ALIAS);
                buffer.write_bool(*v);
            }
            PaintChange::StrokeJoin(v) => write_int(buffer, tag::STROKE_JOIN, *v),
            PaintChange::Typeface {
                font,
                weight,
                italic,
            } => {
                buffer.write_u32(tag::TYPEFACE);
                buffer.write_i32(*font);
                buffer.write_i32(*weight);
                buffer.write_bool(*italic);
            }
            PaintChange::FilterBitmap(v) => {
                buffer.write_u32(tag::FILTER_BITMAP);
                buffer.write_bool(*v);
            }
            PaintChange::BlendMode(v) => write_int(buffer, tag::BLEND_MODE, *v),
        }
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self> {
        let code = reader.read_u32()?;
        Ok(match code {
            tag::TEXT_SIZE => PaintChange::TextSize(reader.read_f32()?.into()),
            tag::COLOR => PaintChange::Color(ColorSlot::literal(reader.read_u32()?)),
            tag::COLOR_ID => {
                let id = check_variable_id(reader.read_u32()?, PaintData::NAME, "color id")?;
                PaintChange::Color(ColorSlot::variable(id))
            }
            tag::STROKE_WIDTH => PaintChange::StrokeWidth(reader.read_f32()?.into()),
            tag::STROKE_MITER => PaintChange::StrokeMiter(reader.read_f32()?.into()),
            tag::STROKE_CAP => PaintChange::StrokeCap(reader.read_i32()?),
            tag::STYLE => PaintChange::Style(reader.read_i32()?),
            tag::SHADER => PaintChange::Shader(reader.read_i32()?),
            tag::FILTER_QUALITY => PaintChange::FilterQuality(reader.read_i32()?),
            tag::ALPHA => PaintChange::Alpha(reader.read_f32()?.into()),
            tag::COLOR_FILTER => PaintChange::ColorFilter {
                color: reader.read_u32()?,
                mode: reader.read_i32()?,
            },
            tag::ANTI_ALIAS => PaintChange::AntiAlias(reader.read_bool()?),
            tag::STROKE_JOIN => PaintChange::StrokeJoin(reader.read_i32()?),
            tag::TYPEFACE => PaintChange::Typeface {
                font: reader.read_i32()?,
                weight: reader.read_i32()?,
                italic: reader.read_bool()?,
            },
            tag::FILTER_BITMAP => PaintChange::FilterBitmap(reader.read_bool()?),
            tag::BLEND_MODE => PaintChange::BlendMode(reader.read_i32()?),
            other => {
                return Err(WireError::InvalidField {
                    operation: PaintData::NAME,
                    field: "paint attribute",
                    value: i64::from(other),
                })
            }
        })
    }

    fn register(&self, registrar: &mut dyn DependencyRegistrar) {
        match self {
            PaintChange::TextSize(v)
            | PaintChange::StrokeWidth(v)
            | PaintChange::StrokeMiter(v)
            | PaintChange::Alpha(v) => v.register(registrar),
            PaintChange::Color(color) => color.register(registrar),
            _ => {}
        }
    }

    fn update(&mut self, resolver: &mut Resolver<'_>) {
        match self {
            PaintChange::TextSize(v)
            | PaintChange::StrokeWidth(v)
            | PaintChange::StrokeMiter(v)
            | PaintChange::Alpha(v) => v.update(resolver),
            PaintChange::Color(color) => color.update(resolver),
            _ => {}
        }
    }
}

fn write_float(buffer: &mut WireBuffer, code: u32, value: &FloatSlot) {
    buffer.write_u32(code);
    buffer.write_f32(value.raw());
}

fn write_int(buffer: &mut WireBuffer, code: u32, value: i32) {
    buffer.write_u32(code);
    buffer.write_i32(value);
}

impl fmt::Display for PaintChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaintChange::TextSize(v) => write!(f, "TextSize({v})"),
            PaintChange::Color(c) => write!(f, "Color({c})"),
            PaintChange::StrokeWidth(v) => write!(f, "StrokeWidth({v})"),
            PaintChange::StrokeMiter(v) => write!(f, "StrokeMiter({v})"),
            PaintChange::StrokeCap(v) => write!(f, "StrokeCap({v})"),
            PaintChange::Style(v) => write!(f, "Style({v})"),
            PaintChange::Shader(v) => write!(f, "Shader({v})"),
            PaintChange::FilterQuality(v) => write!(f, "FilterQuality({v})"),
            PaintChange::Alpha(v) => write!(f, "Alpha({v})"),
            PaintChange::ColorFilter { color, mode } => write!(f, "ColorFilter(#{color:08X}, {mode})"),
            PaintChange::AntiAlias(v) => write!(f, "AntiAlias({v})"),
            PaintChange::StrokeJoin(v) => write!(f, "StrokeJoin({v})"),
            PaintChange::Typeface {
                font,
                weight,
                italic,
            } => write!(f, "Typeface({font}, {weight}, {italic})"),
            PaintChange::FilterBitmap(v) => write!(f, "FilterBitmap({v})"),
            PaintChange::BlendMode(v) => write!(f, "BlendMode({v})"),
        }
    }
}

/// Ordered paint attribute changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintBundle {
    changes: Vec<PaintChange>,
}

impl PaintBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[PaintChange] {
        &self.changes
    }

    pub fn push(&mut self, change: PaintChange) -> &mut Self {
        self.changes.push(change);
        self
    }

    pub fn color(&mut self, argb: u32) -> &mut Self {
        self.push(PaintChange::Color(ColorSlot::literal(argb)))
    }

    pub fn color_id(&mut self, id: u32) -> &mut Self {
        self.push(PaintChange::Color(ColorSlot::variable(id)))
    }

    pub fn stroke_width(&mut self, width: f32) -> &mut Self {
        self.push(PaintChange::StrokeWidth(width.into()))
    }

    pub fn text_size(&mut self, size: f32) -> &mut Self {
        self.push(PaintChange::TextSize(size.into()))
    }

    pub fn style(&mut self, style: i32) -> &mut Self {
        self.push(PaintChange::Style(style))
    }

    pub fn stroke_cap(&mut self, cap: i32) -> &mut Self {
        self.push(PaintChange::StrokeCap(cap))
    }

    pub fn alpha(&mut self, alpha: f32) -> &mut Self {
        self.push(PaintChange::Alpha(alpha.into()))
    }

    pub fn shader(&mut self, shader_id: i32) -> &mut Self {
        self.push(PaintChange::Shader(shader_id))
    }

    pub fn anti_alias(&mut self, enabled: bool) -> &mut Self {
        self.push(PaintChange::AntiAlias(enabled))
    }

    pub fn write_bundle(&self, buffer: &mut WireBuffer) {
        buffer.write_u32(self.changes.len() as u32);
        for change in &self.changes {
            change.write(buffer);
        }
    }

    pub fn read_bundle(reader: &mut WireReader<'_>) -> Result<Self> {
        // Smallest change: tag plus a bool
        let count = reader.read_count(5)?;
        let changes = (0..count)
            .map(|_| PaintChange::read(reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { changes })
    }

    pub fn register_vars(&self, registrar: &mut dyn DependencyRegistrar) {
        self.changes.iter().for_each(|change| change.register(registrar));
    }

    pub fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.changes.iter_mut().for_each(|change| change.update(resolver));
    }
}

impl fmt::Display for PaintBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, change) in self.changes.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{change}")?;
        }
        f.write_str("}")
    }
}

/// Applies a paint bundle to the backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaintData {
    pub bundle: PaintBundle,
}

impl PaintData {
    pub fn new(bundle: PaintBundle) -> Self {
        Self { bundle }
    }
}

impl Decode for PaintData {
    const OPCODE: u32 = Opcode::PAINT_VALUES.raw();
    const NAME: &'static str = "PaintData";
    const SHAPE: RecordShape = RecordShape::Sized;

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self::new(PaintBundle::read_bundle(reader)?))
    }
}

impl Operation for PaintData {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start_sized(Self::OPCODE);
        self.bundle.write_bundle(buffer);
        buffer.end_record();
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.apply_paint(&self.bundle)
    }
}

impl VariableSupport for PaintData {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.bundle.register_vars(registrar);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.bundle.update_variables(resolver);
    }
}

impl fmt::Display for PaintData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaintData {}", self.bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variables::float_ref;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bundle_round_trip() {
        let mut bundle = PaintBundle::new();
        bundle
            .color(0xFF336699)
            .stroke_width(float_ref(43))
            .style(PaintChange::STYLE_STROKE)
            .anti_alias(true)
            .push(PaintChange::Typeface {
                font: 2,
                weight: 700,
                italic: false,
            });
        bundle.color_id(44);

        let mut buffer = WireBuffer::new();
        bundle.write_bundle(&mut buffer);
        let bytes = buffer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(PaintBundle::read_bundle(&mut reader).unwrap(), bundle);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_unknown_paint_attribute() {
        let mut buffer = WireBuffer::new();
        buffer.write_u32(1);
        buffer.write_u32(99);
        buffer.write_i32(0);
        let bytes = buffer.into_bytes();
        let err = PaintBundle::read_bundle(&mut WireReader::new(&bytes)).unwrap_err();
        assert!(matches!(err, WireError::InvalidField { field: "paint attribute", .. }));
    }

    #[test]
    fn test_display() {
        let mut bundle = PaintBundle::new();
        bundle.color(0xFF000000).stroke_width(2.0);
        assert_eq!(PaintData::new(bundle).to_string(), "PaintData {Color(#FF000000), StrokeWidth(2)}");
    }
}
