//! Data declarations
//!
//! Text and float declarations publish variables into the context. Path,
//! bitmap and shader declarations hand their payload to the backend, which
//! owns asset storage.

use std::fmt;

use crate::core::buffer::WireBuffer;
use crate::core::context::{PaintContext, PaintResult, RemoteContext};
use crate::core::opcodes::Opcode;
use crate::core::operation::{
    operation_identity, variable_support, Decode, DependencyRegistrar, Operation, VariableSupport,
};
use crate::core::reader::WireReader;
use crate::core::registry::RecordShape;
use crate::core::variables::{FloatSlot, Resolver, TextSlot, Variable, VariableId};
use crate::error::{Result, WireError};
use crate::operations::read_variable_id;

/// Declares a text variable
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    pub id: VariableId,
    pub text: String,
}

impl TextData {
    pub fn new(id: VariableId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

impl Decode for TextData {
    const OPCODE: u32 = Opcode::DATA_TEXT.raw();
    const NAME: &'static str = "TextData";
    const SHAPE: RecordShape = RecordShape::Sized;

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = read_variable_id(reader, Self::NAME, "id")?;
        let text = reader.read_utf8()?;
        Ok(Self::new(id, text))
    }
}

impl Operation for TextData {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start_sized(Self::OPCODE);
        buffer.write_u32(self.id);
        buffer.write_utf8(&self.text);
        buffer.end_record();
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.load_variable(self.id, Variable::Text(self.text.clone()));
    }
}

impl VariableSupport for TextData {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        registrar.produces(self.id);
    }

    fn update_variables(&mut self, _resolver: &mut Resolver<'_>) {}
}

impl fmt::Display for TextData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextData[{}] = {:?}", self.id, self.text)
    }
}

/// Declares a float variable with a constant value
#[derive(Debug, Clone, Copy)]
pub struct FloatConstant {
    pub id: VariableId,
    pub value: f32,
}

impl FloatConstant {
    pub fn new(id: VariableId, value: f32) -> Self {
        Self { id, value }
    }
}

impl PartialEq for FloatConstant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.value.to_bits() == other.value.to_bits()
    }
}

impl Decode for FloatConstant {
    const OPCODE: u32 = Opcode::DATA_FLOAT.raw();
    const NAME: &'static str = "FloatConstant";
    const SHAPE: RecordShape = RecordShape::Fixed(8);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = read_variable_id(reader, Self::NAME, "id")?;
        Ok(Self::new(id, reader.read_f32()?))
    }
}

impl Operation for FloatConstant {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.id);
        buffer.write_f32(self.value);
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.load_variable(self.id, Variable::Float(self.value));
    }
}

impl VariableSupport for FloatConstant {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        registrar.produces(self.id);
    }

    fn update_variables(&mut self, _resolver: &mut Resolver<'_>) {}
}

impl fmt::Display for FloatConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FloatConstant[{}] = {}", self.id, self.value)
    }
}

/// Path geometry as a flat command/coordinate float array
#[derive(Debug, Clone)]
pub struct PathData {
    pub id: i32,
    pub data: Vec<f32>,
}

impl PathData {
    pub fn new(id: i32, data: Vec<f32>) -> Self {
        Self { id, data }
    }
}

impl PartialEq for PathData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Decode for PathData {
    const OPCODE: u32 = Opcode::DATA_PATH.raw();
    const NAME: &'static str = "PathData";
    const SHAPE: RecordShape = RecordShape::Sized;

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = reader.read_i32()?;
        Ok(Self::new(id, reader.read_f32_array()?))
    }
}

impl Operation for PathData {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start_sized(Self::OPCODE);
        buffer.write_i32(self.id);
        buffer.write_f32_array(&self.data);
        buffer.end_record();
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.load_path(self.id, &self.data)
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathData[{}] = {} values", self.id, self.data.len())
    }
}

/// Encoded image bytes. The pixel encoding is opaque to the format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapData {
    pub id: i32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl BitmapData {
    pub fn new(id: i32, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            id,
            width,
            height,
            pixels,
        }
    }
}

impl Decode for BitmapData {
    const OPCODE: u32 = Opcode::DATA_BITMAP.raw();
    const NAME: &'static str = "BitmapData";
    const SHAPE: RecordShape = RecordShape::Sized;

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = reader.read_i32()?;
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let pixels = reader.read_bytes()?.to_vec();
        Ok(Self::new(id, width, height, pixels))
    }
}

impl Operation for BitmapData {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start_sized(Self::OPCODE);
        buffer.write_i32(self.id);
        buffer.write_u32(self.width);
        buffer.write_u32(self.height);
        buffer.write_bytes(&self.pixels);
        buffer.end_record();
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.load_bitmap(self.id, self.width, self.height, &self.pixels)
    }
}

impl fmt::Display for BitmapData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BitmapData[{}] {} x {}, {} bytes",
            self.id,
            self.width,
            self.height,
            self.pixels.len()
        )
    }
}

/// Named shader uniform
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderUniform {
    Float { name: String, values: Vec<FloatSlot> },
    Int { name: String, values: Vec<i32> },
    Bitmap { name: String, bitmap_id: i32 },
}

impl ShaderUniform {
    const TAG_FLOAT: u8 = 0;
    const TAG_INT: u8 = 1;
    const TAG_BITMAP: u8 = 2;

    pub fn float(name: impl Into<String>, values: &[f32]) -> Self {
        ShaderUniform::Float {
            name: name.into(),
            values: values.iter().copied().map(FloatSlot::new).collect(),
        }
    }

    pub fn int(name: impl Into<String>, values: &[i32]) -> Self {
        ShaderUniform::Int {
            name: name.into(),
            values: values.to_vec(),
        }
    }

    pub fn bitmap(name: impl Into<String>, bitmap_id: i32) -> Self {
        ShaderUniform::Bitmap {
            name: name.into(),
            bitmap_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ShaderUniform::Float { name, .. }
            | ShaderUniform::Int { name, .. }
            | ShaderUniform::Bitmap { name, .. } => name,
        }
    }

    fn write(&self, buffer: &mut WireBuffer) {
        match self {
            ShaderUniform::Float { name, values } => {
                buffer.write_u8(Self::TAG_FLOAT);
                buffer.write_utf8(name);
                buffer.write_u32(values.len() as u32);
                for value in values {
                    buffer.write_f32(value.raw());
                }
            }
            ShaderUniform::Int { name, values } => {
                buffer.write_u8(Self::TAG_INT);
                buffer.write_utf8(name);
                buffer.write_i32_array(values);
            }
            ShaderUniform::Bitmap { name, bitmap_id } => {
                buffer.write_u8(Self::TAG_BITMAP);
                buffer.write_utf8(name);
                buffer.write_i32(*bitmap_id);
            }
        }
    }

    fn read(reader: &mut WireReader<'_>) -> Result<Self> {
        let tag = reader.read_u8()?;
        let name = reader.read_utf8()?.to_owned();
        Ok(match tag {
            Self::TAG_FLOAT => ShaderUniform::Float {
                name,
                values: reader.read_f32_array()?.into_iter().map(FloatSlot::new).collect(),
            },
            Self::TAG_INT => ShaderUniform::Int {
                name,
                values: reader.read_i32_array()?,
            },
            Self::TAG_BITMAP => ShaderUniform::Bitmap {
                name,
                bitmap_id: reader.read_i32()?,
            },
            other => {
                return Err(WireError::InvalidField {
                    operation: ShaderData::NAME,
                    field: "uniform type",
                    value: i64::from(other),
                })
            }
        })
    }
}

/// Runtime shader: source text plus uniform bindings
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderData {
    pub id: i32,
    /// Text variable holding the shader source
    pub source: TextSlot,
    pub uniforms: Vec<ShaderUniform>,
}

impl ShaderData {
    pub fn new(id: i32, source_id: VariableId, uniforms: Vec<ShaderUniform>) -> Self {
        Self {
            id,
            source: TextSlot::new(source_id),
            uniforms,
        }
    }

    /// Resolved values of a float uniform
    pub fn float_uniform(&self, name: &str) -> Option<Vec<f32>> {
        self.uniforms.iter().find_map(|uniform| match uniform {
            ShaderUniform::Float { name: n, values } if n == name => {
                Some(values.iter().map(FloatSlot::get).collect())
            }
            _ => None,
        })
    }
}

impl Decode for ShaderData {
    const OPCODE: u32 = Opcode::DATA_SHADER.raw();
    const NAME: &'static str = "ShaderData";
    const SHAPE: RecordShape = RecordShape::Sized;

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = reader.read_i32()?;
        let source_id = read_variable_id(reader, Self::NAME, "source id")?;
        // Smallest uniform: tag, empty name, bitmap id
        let count = reader.read_count(9)?;
        let uniforms = (0..count)
            .map(|_| ShaderUniform::read(reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(id, source_id, uniforms))
    }
}

impl Operation for ShaderData {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start_sized(Self::OPCODE);
        buffer.write_i32(self.id);
        buffer.write_u32(self.source.id());
        buffer.write_u32(self.uniforms.len() as u32);
        for uniform in &self.uniforms {
            uniform.write(buffer);
        }
        buffer.end_record();
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.load_shader(self)
    }
}

impl VariableSupport for ShaderData {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.source.register(registrar);
        for uniform in &self.uniforms {
            if let ShaderUniform::Float { values, .. } = uniform {
                values.iter().for_each(|value| value.register(registrar));
            }
        }
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.source.update(resolver);
        for uniform in &mut self.uniforms {
            if let ShaderUniform::Float { values, .. } = uniform {
                values.iter_mut().for_each(|value| value.update(resolver));
            }
        }
    }
}

impl fmt::Display for ShaderData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShaderData[{}] source {}", self.id, self.source)?;
        for uniform in &self.uniforms {
            write!(f, ", {}", uniform.name())?;
        }
        Ok(())
    }
}
