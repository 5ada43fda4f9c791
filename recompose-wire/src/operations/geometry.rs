//! Fixed-shape float operations: primitives, rectangular clip and matrix ops
//!
//! Each kind is a fixed list of float parameters, any of which may be a
//! variable reference, mapped onto one backend call.

use std::fmt;

use crate::core::buffer::WireBuffer;
use crate::core::context::{PaintContext, PaintResult};
use crate::core::opcodes::Opcode;
use crate::core::operation::{
    operation_identity, variable_support, Decode, DependencyRegistrar, Operation, VariableSupport,
};
use crate::core::reader::WireReader;
use crate::core::registry::RecordShape;
use crate::core::variables::{FloatSlot, Resolver};
use crate::error::Result;

macro_rules! float_operation {
    (
        $(#[$meta:meta])*
        $name:ident($($field:ident),+) => $opcode:expr, $call:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(pub $field: FloatSlot,)+
        }

        impl $name {
            #[allow(clippy::too_many_arguments)]
            pub fn new($($field: f32),+) -> Self {
                Self {
                    $($field: FloatSlot::new($field),)+
                }
            }
        }

        impl Decode for $name {
            const OPCODE: u32 = $opcode.raw();
            const NAME: &'static str = stringify!($name);
            const SHAPE: RecordShape = RecordShape::Fixed(4 * [$(stringify!($field)),+].len());

            fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
                Ok(Self {
                    $($field: FloatSlot::new(reader.read_f32()?),)+
                })
            }
        }

        impl Operation for $name {
            operation_identity!();
            variable_support!();

            fn write(&self, buffer: &mut WireBuffer) {
                buffer.start(Self::OPCODE);
                $(buffer.write_f32(self.$field.raw());)+
            }

            fn is_paint(&self) -> bool {
                true
            }

            fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
                canvas.$call($(self.$field.get()),+)
            }
        }

        impl VariableSupport for $name {
            fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
                $(self.$field.register(registrar);)+
            }

            fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
                $(self.$field.update(resolver);)+
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(stringify!($name))?;
                for (index, value) in [$(&self.$field),+].into_iter().enumerate() {
                    f.write_str(if index == 0 { " " } else { ", " })?;
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    };
}

float_operation! {
    DrawArc(left, top, right, bottom, start_angle, sweep_angle) => Opcode::DRAW_ARC, draw_arc
}

float_operation! {
    DrawCircle(center_x, center_y, radius) => Opcode::DRAW_CIRCLE, draw_circle
}

float_operation! {
    DrawLine(x1, y1, x2, y2) => Opcode::DRAW_LINE, draw_line
}

float_operation! {
    DrawOval(left, top, right, bottom) => Opcode::DRAW_OVAL, draw_oval
}

float_operation! {
    DrawRect(left, top, right, bottom) => Opcode::DRAW_RECT, draw_rect
}

float_operation! {
    DrawRoundRect(left, top, right, bottom, radius_x, radius_y) => Opcode::DRAW_ROUND_RECT, draw_round_rect
}

float_operation! {
    /// Intersect the clip with a rectangle
    ClipRect(left, top, right, bottom) => Opcode::CLIP_RECT, clip_rect
}

float_operation! {
    /// Scale around a pivot
    MatrixScale(scale_x, scale_y, center_x, center_y) => Opcode::MATRIX_SCALE, matrix_scale
}

float_operation! {
    MatrixTranslate(dx, dy) => Opcode::MATRIX_TRANSLATE, matrix_translate
}

float_operation! {
    MatrixSkew(skew_x, skew_y) => Opcode::MATRIX_SKEW, matrix_skew
}

float_operation! {
    /// Rotate by degrees around a pivot
    MatrixRotate(degrees, center_x, center_y) => Opcode::MATRIX_ROTATE, matrix_rotate
}

/// Push the backend's transform and clip state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixSave;

impl MatrixSave {
    pub fn new() -> Self {
        MatrixSave
    }
}

impl Decode for MatrixSave {
    const OPCODE: u32 = Opcode::MATRIX_SAVE.raw();
    const NAME: &'static str = "MatrixSave";
    const SHAPE: RecordShape = RecordShape::Fixed(0);

    fn decode(_reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(MatrixSave)
    }
}

impl Operation for MatrixSave {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.matrix_save()
    }
}

impl fmt::Display for MatrixSave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MatrixSave")
    }
}

/// Pop the state pushed by the matching [`MatrixSave`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixRestore;

impl MatrixRestore {
    pub fn new() -> Self {
        MatrixRestore
    }
}

impl Decode for MatrixRestore {
    const OPCODE: u32 = Opcode::MATRIX_RESTORE.raw();
    const NAME: &'static str = "MatrixRestore";
    const SHAPE: RecordShape = RecordShape::Fixed(0);

    fn decode(_reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(MatrixRestore)
    }
}

impl Operation for MatrixRestore {
    operation_identity!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
    }

    fn is_paint(&self) -> bool {
        true
    }

    fn paint(&self, canvas: &mut dyn PaintContext) -> PaintResult {
        canvas.matrix_restore()
    }
}

impl fmt::Display for MatrixRestore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MatrixRestore")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variables::{float_ref, Variable, VariableId, VariableSource};
    use rstest::rstest;

    struct One(VariableId, Variable);

    impl VariableSource for One {
        fn variable(&self, id: VariableId) -> Option<&Variable> {
            (id == self.0).then_some(&self.1)
        }
    }

    #[rstest]
    #[case(DrawArc::SHAPE, 24)]
    #[case(DrawCircle::SHAPE, 12)]
    #[case(DrawLine::SHAPE, 16)]
    #[case(MatrixTranslate::SHAPE, 8)]
    #[case(MatrixSave::SHAPE, 0)]
    fn test_fixed_shapes(#[case] shape: RecordShape, #[case] len: usize) {
        assert_eq!(shape, RecordShape::Fixed(len));
    }

    #[test]
    fn test_circle_round_trip() {
        let circle = DrawCircle::new(10.0, -20.0, 0.0);
        let mut buffer = WireBuffer::new();
        circle.write(&mut buffer);
        let bytes = buffer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_u32().unwrap(), 46);
        assert_eq!(DrawCircle::decode(&mut reader).unwrap(), circle);
    }

    #[test]
    fn test_variable_radius_resolves() {
        let mut circle = DrawCircle::new(1.0, 2.0, float_ref(50));
        assert_eq!(circle.radius.get(), 0.0);
        circle.update_variables(&mut Resolver::new(&One(50, Variable::Float(8.0))));
        assert_eq!(circle.radius.get(), 8.0);
        assert_eq!(circle.center_x.get(), 1.0);
        assert_eq!(circle.to_string(), "DrawCircle 1, 2, [50]");
    }
}
