//! Opcode definitions for the document format
//!
//! Opcodes are a sparse, externally assigned enumeration. The registry keys
//! decoders by the raw `u32`, so applications can register opcodes that are
//! not listed here.

/// Built-in opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
#[allow(non_camel_case_types)] // Opcodes follow wire-format naming convention
pub enum Opcode {
    // Protocol
    HEADER = 0,
    THEME = 63,
    CLICK_AREA = 64,
    ROOT_CONTENT_BEHAVIOR = 65,
    ROOT_CONTENT_DESCRIPTION = 103,

    // Data declarations
    DATA_SHADER = 45,
    DATA_FLOAT = 80,
    DATA_BITMAP = 101,
    DATA_TEXT = 102,
    DATA_PATH = 123,

    // Expressions
    ANIMATED_FLOAT = 81,
    COLOR_EXPRESSIONS = 134,
    TEXT_FROM_FLOAT = 135,
    TEXT_MERGE = 136,

    // Paint and clip
    CLIP_PATH = 38,
    CLIP_RECT = 39,
    PAINT_VALUES = 40,

    // Draw commands
    DRAW_RECT = 42,
    DRAW_TEXT_RUN = 43,
    DRAW_BITMAP = 44,
    DRAW_CIRCLE = 46,
    DRAW_LINE = 47,
    DRAW_ROUND_RECT = 51,
    DRAW_ARC = 52,
    DRAW_TEXT_ON_PATH = 53,
    DRAW_OVAL = 56,
    DRAW_BITMAP_INT = 66,
    DRAW_PATH = 124,
    DRAW_TWEEN_PATH = 125,
    DRAW_TEXT_ANCHOR = 133,

    // Matrix operations
    MATRIX_SCALE = 126,
    MATRIX_TRANSLATE = 127,
    MATRIX_SKEW = 128,
    MATRIX_ROTATE = 129,
    MATRIX_SAVE = 130,
    MATRIX_RESTORE = 131,
}

impl Opcode {
    pub const ALL: [Opcode; 36] = [
        Opcode::HEADER,
        Opcode::THEME,
        Opcode::CLICK_AREA,
        Opcode::ROOT_CONTENT_BEHAVIOR,
        Opcode::ROOT_CONTENT_DESCRIPTION,
        Opcode::DATA_SHADER,
        Opcode::DATA_FLOAT,
        Opcode::DATA_BITMAP,
        Opcode::DATA_TEXT,
        Opcode::DATA_PATH,
        Opcode::ANIMATED_FLOAT,
        Opcode::COLOR_EXPRESSIONS,
        Opcode::TEXT_FROM_FLOAT,
        Opcode::TEXT_MERGE,
        Opcode::CLIP_PATH,
        Opcode::CLIP_RECT,
        Opcode::PAINT_VALUES,
        Opcode::DRAW_RECT,
        Opcode::DRAW_TEXT_RUN,
        Opcode::DRAW_BITMAP,
        Opcode::DRAW_CIRCLE,
        Opcode::DRAW_LINE,
        Opcode::DRAW_ROUND_RECT,
        Opcode::DRAW_ARC,
        Opcode::DRAW_TEXT_ON_PATH,
        Opcode::DRAW_OVAL,
        Opcode::DRAW_BITMAP_INT,
        Opcode::DRAW_PATH,
        Opcode::DRAW_TWEEN_PATH,
        Opcode::DRAW_TEXT_ANCHOR,
        Opcode::MATRIX_SCALE,
        Opcode::MATRIX_TRANSLATE,
        Opcode::MATRIX_SKEW,
        Opcode::MATRIX_ROTATE,
        Opcode::MATRIX_SAVE,
        Opcode::MATRIX_RESTORE,
    ];

    /// Parse a built-in opcode from its raw value
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| *op as u32 == raw)
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Check if this opcode mutates the backend's matrix stack
    pub fn is_matrix_op(&self) -> bool {
        matches!(
            self,
            Opcode::MATRIX_SCALE
                | Opcode::MATRIX_TRANSLATE
                | Opcode::MATRIX_SKEW
                | Opcode::MATRIX_ROTATE
                | Opcode::MATRIX_SAVE
                | Opcode::MATRIX_RESTORE
        )
    }

    /// Check if this opcode declares data rather than drawing
    pub fn is_data_declaration(&self) -> bool {
        matches!(
            self,
            Opcode::DATA_SHADER
                | Opcode::DATA_FLOAT
                | Opcode::DATA_BITMAP
                | Opcode::DATA_TEXT
                | Opcode::DATA_PATH
        )
    }
}

impl From<Opcode> for u32 {
    fn from(opcode: Opcode) -> Self {
        opcode as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_raw() {
        assert_eq!(Opcode::from_raw(46), Some(Opcode::DRAW_CIRCLE));
        assert_eq!(Opcode::from_raw(130), Some(Opcode::MATRIX_SAVE));
        assert_eq!(Opcode::from_raw(1), None);
        assert_eq!(Opcode::from_raw(u32::MAX), None);
    }

    #[test]
    fn test_opcodes_are_unique() {
        let mut raw: Vec<u32> = Opcode::ALL.iter().map(|op| op.raw()).collect();
        raw.sort_unstable();
        raw.dedup();
        assert_eq!(raw.len(), Opcode::ALL.len());
    }

    #[test]
    fn test_opcode_properties() {
        assert!(Opcode::MATRIX_SAVE.is_matrix_op());
        assert!(!Opcode::DRAW_CIRCLE.is_matrix_op());
        assert!(Opcode::DATA_TEXT.is_data_declaration());
        assert!(!Opcode::TEXT_MERGE.is_data_declaration());
    }
}
