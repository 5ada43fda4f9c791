//! Built-in operation kinds
//!
//! Every kind is a plain data carrier implementing [`Operation`](crate::Operation) for the
//! instance side and [`Decode`](crate::Decode) for its opcode, record shape and decoder.

pub mod data;
pub mod draw;
pub mod expression;
pub mod geometry;
pub mod paint;
pub mod protocol;

use crate::core::reader::WireReader;
use crate::core::registry::OpcodeRegistry;
use crate::core::variables::{VariableId, OPERATOR_BASE};
use crate::error::{Result, WireError};

pub use self::data::{BitmapData, FloatConstant, PathData, ShaderData, ShaderUniform, TextData};
pub use self::draw::{
    AnchorFlags, ClipPath, DrawBitmap, DrawBitmapInt, DrawPath, DrawTextAnchored, DrawTextOnPath,
    DrawTextRun, DrawTweenPath,
};
pub use self::expression::{ColorExpression, FloatExpression, MathOperator, TextFromFloat, TextMerge};
pub use self::geometry::{
    ClipRect, DrawArc, DrawCircle, DrawLine, DrawOval, DrawRect, DrawRoundRect, MatrixRestore,
    MatrixRotate, MatrixSave, MatrixScale, MatrixSkew, MatrixTranslate,
};
pub use self::paint::{PaintBundle, PaintChange, PaintData};
pub use self::protocol::{ClickArea, Header, RootContentBehavior, RootContentDescription, Theme};

/// Register every built-in kind
pub fn register_standard(registry: &mut OpcodeRegistry) -> Result<()> {
    // Protocol
    registry.register_kind::<Header>()?;
    registry.register_kind::<Theme>()?;
    registry.register_kind::<ClickArea>()?;
    registry.register_kind::<RootContentBehavior>()?;
    registry.register_kind::<RootContentDescription>()?;

    // Data declarations
    registry.register_kind::<TextData>()?;
    registry.register_kind::<FloatConstant>()?;
    registry.register_kind::<PathData>()?;
    registry.register_kind::<BitmapData>()?;
    registry.register_kind::<ShaderData>()?;

    // Expressions
    registry.register_kind::<FloatExpression>()?;
    registry.register_kind::<ColorExpression>()?;
    registry.register_kind::<TextFromFloat>()?;
    registry.register_kind::<TextMerge>()?;

    // Paint and clip
    registry.register_kind::<PaintData>()?;
    registry.register_kind::<ClipPath>()?;
    registry.register_kind::<ClipRect>()?;

    // Matrix
    registry.register_kind::<MatrixSave>()?;
    registry.register_kind::<MatrixRestore>()?;
    registry.register_kind::<MatrixScale>()?;
    registry.register_kind::<MatrixTranslate>()?;
    registry.register_kind::<MatrixSkew>()?;
    registry.register_kind::<MatrixRotate>()?;

    // Draw
    registry.register_kind::<DrawArc>()?;
    registry.register_kind::<DrawCircle>()?;
    registry.register_kind::<DrawLine>()?;
    registry.register_kind::<DrawOval>()?;
    registry.register_kind::<DrawRect>()?;
    registry.register_kind::<DrawRoundRect>()?;
    registry.register_kind::<DrawPath>()?;
    registry.register_kind::<DrawTweenPath>()?;
    registry.register_kind::<DrawTextRun>()?;
    registry.register_kind::<DrawTextAnchored>()?;
    registry.register_kind::<DrawTextOnPath>()?;
    registry.register_kind::<DrawBitmap>()?;
    registry.register_kind::<DrawBitmapInt>()?;

    tracing::debug!(kinds = registry.len(), "registered standard operations");
    Ok(())
}

/// Read a variable id that must be referable through a NaN-encoded float
pub(crate) fn read_variable_id(
    reader: &mut WireReader<'_>,
    operation: &'static str,
    field: &'static str,
) -> Result<VariableId> {
    let id = reader.read_u32()?;
    check_variable_id(id, operation, field)
}

pub(crate) fn check_variable_id(
    id: u32,
    operation: &'static str,
    field: &'static str,
) -> Result<VariableId> {
    if id == 0 || id >= OPERATOR_BASE {
        return Err(WireError::InvalidField {
            operation,
            field,
            value: i64::from(id),
        });
    }
    Ok(id)
}
