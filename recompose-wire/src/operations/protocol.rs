//! Document-level records
//!
//! These carry no drawing semantics. Applying one records its payload as a
//! [`DocumentProperty`] on the context, unchanged.

use std::fmt;

use crate::core::buffer::WireBuffer;
use crate::core::context::{DocumentProperty, RemoteContext};
use crate::core::opcodes::Opcode;
use crate::core::operation::{
    operation_identity, variable_support, Decode, DependencyRegistrar, Operation, VariableSupport,
};
use crate::core::reader::WireReader;
use crate::core::registry::RecordShape;
use crate::core::variables::{FloatSlot, Resolver, VariableId};
use crate::error::{Result, WireError};
use crate::operations::read_variable_id;
use crate::{WIRE_VERSION_MAJOR, WIRE_VERSION_MINOR, WIRE_VERSION_PATCH};

/// Leading metadata record: format version, document size and capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub width: u32,
    pub height: u32,
    pub capabilities: u64,
}

impl Header {
    /// Header for the current format version
    pub fn new(width: u32, height: u32, capabilities: u64) -> Self {
        Self {
            major: WIRE_VERSION_MAJOR,
            minor: WIRE_VERSION_MINOR,
            patch: WIRE_VERSION_PATCH,
            width,
            height,
            capabilities,
        }
    }
}

impl Decode for Header {
    const OPCODE: u32 = Opcode::HEADER.raw();
    const NAME: &'static str = "Header";
    const SHAPE: RecordShape = RecordShape::Fixed(28);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            major: reader.read_u32()?,
            minor: reader.read_u32()?,
            patch: reader.read_u32()?,
            width: reader.read_u32()?,
            height: reader.read_u32()?,
            capabilities: reader.read_u64()?,
        })
    }
}

impl Operation for Header {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.major);
        buffer.write_u32(self.minor);
        buffer.write_u32(self.patch);
        buffer.write_u32(self.width);
        buffer.write_u32(self.height);
        buffer.write_u64(self.capabilities);
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.set_property(DocumentProperty::Header(*self));
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header v{}.{}.{} {} x {}, {:#x}",
            self.major, self.minor, self.patch, self.width, self.height, self.capabilities
        )
    }
}

/// Requested host theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub theme: i32,
}

impl Theme {
    pub const UNSPECIFIED: i32 = -1;
    pub const DARK: i32 = -2;
    pub const LIGHT: i32 = -3;

    pub fn new(theme: i32) -> Self {
        Self { theme }
    }
}

impl Decode for Theme {
    const OPCODE: u32 = Opcode::THEME.raw();
    const NAME: &'static str = "Theme";
    const SHAPE: RecordShape = RecordShape::Fixed(4);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self::new(reader.read_i32()?))
    }
}

impl Operation for Theme {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_i32(self.theme);
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.set_property(DocumentProperty::Theme(self.theme));
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Theme {}", self.theme)
    }
}

/// Interactive region. Passed through to the host as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickArea {
    pub id: i32,
    /// Text variable describing the area, 0 when absent
    pub content_description: VariableId,
    pub left: FloatSlot,
    pub top: FloatSlot,
    pub right: FloatSlot,
    pub bottom: FloatSlot,
    /// Text variable with host-defined metadata, 0 when absent
    pub metadata: VariableId,
}

impl ClickArea {
    pub fn new(
        id: i32,
        content_description: VariableId,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        metadata: VariableId,
    ) -> Self {
        Self {
            id,
            content_description,
            left: left.into(),
            top: top.into(),
            right: right.into(),
            bottom: bottom.into(),
            metadata,
        }
    }
}

impl Decode for ClickArea {
    const OPCODE: u32 = Opcode::CLICK_AREA.raw();
    const NAME: &'static str = "ClickArea";
    const SHAPE: RecordShape = RecordShape::Fixed(28);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            id: reader.read_i32()?,
            content_description: reader.read_u32()?,
            left: reader.read_f32()?.into(),
            top: reader.read_f32()?.into(),
            right: reader.read_f32()?.into(),
            bottom: reader.read_f32()?.into(),
            metadata: reader.read_u32()?,
        })
    }
}

impl Operation for ClickArea {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_i32(self.id);
        buffer.write_u32(self.content_description);
        buffer.write_f32(self.left.raw());
        buffer.write_f32(self.top.raw());
        buffer.write_f32(self.right.raw());
        buffer.write_f32(self.bottom.raw());
        buffer.write_u32(self.metadata);
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.set_property(DocumentProperty::ClickArea(self.clone()));
    }
}

impl VariableSupport for ClickArea {
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

impl fmt::Display for ClickArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClickArea <{}> [{}] {}, {}, {}, {}",
            self.id, self.content_description, self.left, self.top, self.right, self.bottom
        )
    }
}

/// How the root content scrolls, aligns and sizes itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootContentBehavior {
    pub scroll: i32,
    pub alignment: i32,
    pub sizing: i32,
    pub mode: i32,
}

impl RootContentBehavior {
    pub const NONE: i32 = 0;

    pub const SCROLL_HORIZONTAL: i32 = 1;
    pub const SCROLL_VERTICAL: i32 = 2;

    pub const SIZING_LAYOUT: i32 = 1;
    pub const SIZING_SCALE: i32 = 2;

    pub const ALIGNMENT_TOP: i32 = 1;
    pub const ALIGNMENT_VERTICAL_CENTER: i32 = 2;
    pub const ALIGNMENT_BOTTOM: i32 = 4;
    pub const ALIGNMENT_START: i32 = 16;
    pub const ALIGNMENT_HORIZONTAL_CENTER: i32 = 32;
    pub const ALIGNMENT_END: i32 = 64;
    pub const ALIGNMENT_CENTER: i32 = Self::ALIGNMENT_HORIZONTAL_CENTER + Self::ALIGNMENT_VERTICAL_CENTER;

    pub const LAYOUT_MATCH_PARENT: i32 = 1;
    pub const SCALE_INSIDE: i32 = 1;
    pub const SCALE_FILL_WIDTH: i32 = 2;
    pub const SCALE_FILL_HEIGHT: i32 = 3;
    pub const SCALE_FIT: i32 = 4;
    pub const SCALE_CROP: i32 = 5;
    pub const SCALE_FILL_BOUNDS: i32 = 6;

    pub fn new(scroll: i32, alignment: i32, sizing: i32, mode: i32) -> Self {
        Self {
            scroll,
            alignment,
            sizing,
            mode,
        }
    }
}

impl Decode for RootContentBehavior {
    const OPCODE: u32 = Opcode::ROOT_CONTENT_BEHAVIOR.raw();
    const NAME: &'static str = "RootContentBehavior";
    const SHAPE: RecordShape = RecordShape::Fixed(16);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            scroll: reader.read_i32()?,
            alignment: reader.read_i32()?,
            sizing: reader.read_i32()?,
            mode: reader.read_i32()?,
        })
    }
}

impl Operation for RootContentBehavior {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_i32(self.scroll);
        buffer.write_i32(self.alignment);
        buffer.write_i32(self.sizing);
        buffer.write_i32(self.mode);
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.set_property(DocumentProperty::RootContentBehavior(*self));
    }
}

impl fmt::Display for RootContentBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RootContentBehavior scroll: {}, alignment: {}, sizing: {}, mode: {}",
            self.scroll, self.alignment, self.sizing, self.mode
        )
    }
}

/// Accessibility description of the whole document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootContentDescription {
    /// Text variable holding the description
    pub content_description: VariableId,
}

impl RootContentDescription {
    pub fn new(content_description: VariableId) -> Self {
        Self {
            content_description,
        }
    }
}

impl Decode for RootContentDescription {
    const OPCODE: u32 = Opcode::ROOT_CONTENT_DESCRIPTION.raw();
    const NAME: &'static str = "RootContentDescription";
    const SHAPE: RecordShape = RecordShape::Fixed(4);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self::new(read_variable_id(reader, Self::NAME, "content description")?))
    }
}

impl Operation for RootContentDescription {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.content_description);
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.set_property(DocumentProperty::RootContentDescription(
            self.content_description,
        ));
    }
}

impl fmt::Display for RootContentDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootContentDescription [{}]", self.content_description)
    }
}

/// Reject headers from an incompatible major version
pub fn check_version(header: &Header) -> Result<()> {
    if header.major != WIRE_VERSION_MAJOR {
        return Err(WireError::InvalidField {
            operation: Header::NAME,
            field: "major version",
            value: i64::from(header.major),
        });
    }
    Ok(())
}
