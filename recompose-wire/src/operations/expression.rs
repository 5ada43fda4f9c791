//! Expression operations: values derived from other variables
//!
//! Each expression listens to its operands and produces one variable. The
//! update pass evaluates it once per frame, after every producer it depends on.

use std::fmt;

use crate::core::buffer::WireBuffer;
use crate::core::context::RemoteContext;
use crate::core::opcodes::Opcode;
use crate::core::operation::{
    operation_identity, variable_support, Decode, DependencyRegistrar, Operation, VariableSupport,
};
use crate::core::reader::WireReader;
use crate::core::registry::RecordShape;
use crate::core::variables::{
    as_nan, reference_from_nan, ColorSlot, FloatSlot, Resolver, TextSlot, Variable, VariableId,
    DEFAULT_COLOR, OPERATOR_BASE,
};
use crate::error::{Result, WireError};
use crate::operations::{check_variable_id, read_variable_id};

/// Operators of a reverse-polish float expression
///
/// On the wire an operator is a tagged NaN whose id is `OPERATOR_BASE + n`.
/// Operands are popped in push order: for `a b SUB` the result is `a - b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MathOperator {
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    Mod = 5,
    Min = 6,
    Max = 7,
    Pow = 8,
    Sqrt = 9,
    Abs = 10,
    Sign = 11,
    CopySign = 12,
    Exp = 13,
    Floor = 14,
    Log = 15,
    Ln = 16,
    Round = 17,
    Sin = 18,
    Cos = 19,
    Tan = 20,
    Asin = 21,
    Acos = 22,
    Atan = 23,
    Atan2 = 24,
    /// `a * b + c`
    Mad = 25,
    /// `c > 0 ? b : a`
    IfElse = 26,
    /// `a` clamped to `[b, c]`
    Clamp = 27,
    Cbrt = 28,
    Deg = 29,
    Rad = 30,
    Ceil = 31,
}

impl MathOperator {
    const ALL: [MathOperator; 31] = [
        MathOperator::Add,
        MathOperator::Sub,
        MathOperator::Mul,
        MathOperator::Div,
        MathOperator::Mod,
        MathOperator::Min,
        MathOperator::Max,
        MathOperator::Pow,
        MathOperator::Sqrt,
        MathOperator::Abs,
        MathOperator::Sign,
        MathOperator::CopySign,
        MathOperator::Exp,
        MathOperator::Floor,
        MathOperator::Log,
        MathOperator::Ln,
        MathOperator::Round,
        MathOperator::Sin,
        MathOperator::Cos,
        MathOperator::Tan,
        MathOperator::Asin,
        MathOperator::Acos,
        MathOperator::Atan,
        MathOperator::Atan2,
        MathOperator::Mad,
        MathOperator::IfElse,
        MathOperator::Clamp,
        MathOperator::Cbrt,
        MathOperator::Deg,
        MathOperator::Rad,
        MathOperator::Ceil,
    ];

    /// Operator for a NaN reference id
    pub fn from_id(id: u32) -> Option<Self> {
        let index = id.checked_sub(OPERATOR_BASE + 1)? as usize;
        Self::ALL.get(index).copied()
    }

    pub fn id(self) -> u32 {
        OPERATOR_BASE + self as u32
    }

    /// The operator as an expression element
    pub fn as_float(self) -> f32 {
        as_nan(self.id())
    }

    pub fn arity(self) -> usize {
        use MathOperator::*;
        match self {
            Add | Sub | Mul | Div | Mod | Min | Max | Pow | CopySign | Atan2 => 2,
            Mad | IfElse | Clamp => 3,
            _ => 1,
        }
    }

    fn eval(self, args: &[f32]) -> f32 {
        use MathOperator::*;
        match (self, args) {
            (Add, [a, b]) => a + b,
            (Sub, [a, b]) => a - b,
            (Mul, [a, b]) => a * b,
            (Div, [a, b]) => a / b,
            (Mod, [a, b]) => a % b,
            (Min, [a, b]) => a.min(*b),
            (Max, [a, b]) => a.max(*b),
            (Pow, [a, b]) => a.powf(*b),
            (CopySign, [a, b]) => a.copysign(*b),
            (Atan2, [a, b]) => a.atan2(*b),
            (Sqrt, [a]) => a.sqrt(),
            (Abs, [a]) => a.abs(),
            (Sign, [a]) => {
                if *a == 0.0 {
                    0.0
                } else {
                    a.signum()
                }
            }
            (Exp, [a]) => a.exp(),
            (Floor, [a]) => a.floor(),
            (Log, [a]) => a.log10(),
            (Ln, [a]) => a.ln(),
            (Round, [a]) => a.round(),
            (Sin, [a]) => a.sin(),
            (Cos, [a]) => a.cos(),
            (Tan, [a]) => a.tan(),
            (Asin, [a]) => a.asin(),
            (Acos, [a]) => a.acos(),
            (Atan, [a]) => a.atan(),
            (Cbrt, [a]) => a.cbrt(),
            (Deg, [a]) => a.to_degrees(),
            (Rad, [a]) => a.to_radians(),
            (Ceil, [a]) => a.ceil(),
            (Mad, [a, b, c]) => a * b + c,
            (IfElse, [a, b, c]) => {
                if *c > 0.0 {
                    *b
                } else {
                    *a
                }
            }
            (Clamp, [a, b, c]) => a.max(*b).min(*c),
            _ => f32::NAN,
        }
    }

    pub fn symbol(self) -> &'static str {
        use MathOperator::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Min => "min",
            Max => "max",
            Pow => "pow",
            Sqrt => "sqrt",
            Abs => "abs",
            Sign => "sign",
            CopySign => "copySign",
            Exp => "exp",
            Floor => "floor",
            Log => "log",
            Ln => "ln",
            Round => "round",
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Asin => "asin",
            Acos => "acos",
            Atan => "atan",
            Atan2 => "atan2",
            Mad => "mad",
            IfElse => "?:",
            Clamp => "clamp",
            Cbrt => "cbrt",
            Deg => "deg",
            Rad => "rad",
            Ceil => "ceil",
        }
    }
}

/// Float variable computed from a reverse-polish expression
///
/// Elements are literals, variable references or [`MathOperator`]s. The
/// expression is validated at decode time, so evaluation cannot underflow.
#[derive(Debug, Clone)]
pub struct FloatExpression {
    pub id: VariableId,
    expression: Vec<FloatSlot>,
    value: f32,
}

impl FloatExpression {
    pub fn new(id: VariableId, expression: Vec<f32>) -> Result<Self> {
        let expression: Vec<FloatSlot> = expression.into_iter().map(FloatSlot::new).collect();
        validate_rpn(&expression)?;
        let mut op = Self {
            id,
            expression,
            value: 0.0,
        };
        op.value = op.evaluate();
        Ok(op)
    }

    /// Result of the last evaluation
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn expression(&self) -> &[FloatSlot] {
        &self.expression
    }

    fn evaluate(&self) -> f32 {
        let mut stack: Vec<f32> = Vec::with_capacity(self.expression.len());
        for element in &self.expression {
            match operator_of(element) {
                Some(operator) => {
                    let split = stack.len().saturating_sub(operator.arity());
                    let result = operator.eval(&stack[split..]);
                    stack.truncate(split);
                    stack.push(result);
                }
                None => stack.push(element.get()),
            }
        }
        stack.last().copied().unwrap_or(0.0)
    }
}

fn operator_of(element: &FloatSlot) -> Option<MathOperator> {
    reference_from_nan(element.raw())
        .filter(|id| *id >= OPERATOR_BASE)
        .and_then(MathOperator::from_id)
}

/// Check stack depth and operator ids of an expression
fn validate_rpn(expression: &[FloatSlot]) -> Result<()> {
    let invalid = |field, value: i64| WireError::InvalidField {
        operation: FloatExpression::NAME,
        field,
        value,
    };

    let mut depth: usize = 0;
    for element in expression {
        match reference_from_nan(element.raw()) {
            Some(id) if id >= OPERATOR_BASE => {
                let operator =
                    MathOperator::from_id(id).ok_or_else(|| invalid("operator", i64::from(id)))?;
                if depth < operator.arity() {
                    return Err(invalid("stack depth", depth as i64));
                }
                depth = depth - operator.arity() + 1;
            }
            _ => depth += 1,
        }
    }
    if depth != 1 {
        return Err(invalid("stack depth", depth as i64));
    }
    Ok(())
}

impl PartialEq for FloatExpression {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.expression == other.expression
    }
}

impl Decode for FloatExpression {
    const OPCODE: u32 = Opcode::ANIMATED_FLOAT.raw();
    const NAME: &'static str = "FloatExpression";
    const SHAPE: RecordShape = RecordShape::Sized;

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = read_variable_id(reader, Self::NAME, "id")?;
        Self::new(id, reader.read_f32_array()?)
    }
}

impl Operation for FloatExpression {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start_sized(Self::OPCODE);
        buffer.write_u32(self.id);
        buffer.write_u32(self.expression.len() as u32);
        for element in &self.expression {
            buffer.write_f32(element.raw());
        }
        buffer.end_record();
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.load_variable(self.id, Variable::Float(self.value));
    }
}

impl VariableSupport for FloatExpression {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        for element in &self.expression {
            element.register(registrar);
        }
        registrar.produces(self.id);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        for element in &mut self.expression {
            element.update(resolver);
        }
        self.value = self.evaluate();
    }
}

impl fmt::Display for FloatExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FloatExpression[{}] =", self.id)?;
        for element in &self.expression {
            match operator_of(element) {
                Some(operator) => write!(f, " {}", operator.symbol())?,
                None => write!(f, " {element}")?,
            }
        }
        Ok(())
    }
}

/// Color variable interpolated between two colors
///
/// Mode bit 0 marks the first color as a variable id, bit 1 the second.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorExpression {
    pub id: VariableId,
    pub from: ColorSlot,
    pub to: ColorSlot,
    /// Interpolation factor, clamped to `[0, 1]`
    pub tween: FloatSlot,
    value: u32,
}

impl ColorExpression {
    pub const FROM_IS_VARIABLE: u32 = 1;
    pub const TO_IS_VARIABLE: u32 = 2;

    pub fn new(id: VariableId, from: ColorSlot, to: ColorSlot, tween: f32) -> Self {
        let mut op = Self {
            id,
            from,
            to,
            tween: FloatSlot::new(tween),
            value: DEFAULT_COLOR,
        };
        op.value = op.evaluate();
        op
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    fn mode(&self) -> u32 {
        let mut mode = 0;
        if self.from.variable_id().is_some() {
            mode |= Self::FROM_IS_VARIABLE;
        }
        if self.to.variable_id().is_some() {
            mode |= Self::TO_IS_VARIABLE;
        }
        mode
    }

    fn evaluate(&self) -> u32 {
        interpolate_argb(self.from.get(), self.to.get(), self.tween.get())
    }
}

fn color_word(color: &ColorSlot) -> u32 {
    match color.variable_id() {
        Some(id) => id,
        None => color.get(),
    }
}

/// Per-channel linear interpolation of two ARGB colors
pub fn interpolate_argb(from: u32, to: u32, tween: f32) -> u32 {
    let t = if tween.is_nan() { 0.0 } else { tween.clamp(0.0, 1.0) };
    let mut out = 0u32;
    for shift in [24u32, 16, 8, 0] {
        let a = ((from >> shift) & 0xFF) as f32;
        let b = ((to >> shift) & 0xFF) as f32;
        let channel = (a + (b - a) * t).round() as u32;
        out |= (channel & 0xFF) << shift;
    }
    out
}

impl Decode for ColorExpression {
    const OPCODE: u32 = Opcode::COLOR_EXPRESSIONS.raw();
    const NAME: &'static str = "ColorExpression";
    const SHAPE: RecordShape = RecordShape::Fixed(20);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = read_variable_id(reader, Self::NAME, "id")?;
        let mode = reader.read_u32()?;
        if mode > (Self::FROM_IS_VARIABLE | Self::TO_IS_VARIABLE) {
            return Err(WireError::InvalidField {
                operation: Self::NAME,
                field: "mode",
                value: i64::from(mode),
            });
        }
        let slot = |word: u32, is_variable: bool| -> Result<ColorSlot> {
            Ok(if is_variable {
                ColorSlot::variable(check_variable_id(word, Self::NAME, "color id")?)
            } else {
                ColorSlot::literal(word)
            })
        };
        let from = slot(reader.read_u32()?, mode & Self::FROM_IS_VARIABLE != 0)?;
        let to = slot(reader.read_u32()?, mode & Self::TO_IS_VARIABLE != 0)?;
        let tween = reader.read_f32()?;
        Ok(Self::new(id, from, to, tween))
    }
}

impl Operation for ColorExpression {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.id);
        buffer.write_u32(self.mode());
        buffer.write_u32(color_word(&self.from));
        buffer.write_u32(color_word(&self.to));
        buffer.write_f32(self.tween.raw());
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.load_variable(self.id, Variable::Color(self.value));
    }
}

impl VariableSupport for ColorExpression {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.from.register(registrar);
        self.to.register(registrar);
        self.tween.register(registrar);
        registrar.produces(self.id);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.from.update(resolver);
        self.to.update(resolver);
        self.tween.update(resolver);
        self.value = self.evaluate();
    }
}

impl fmt::Display for ColorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ColorExpression[{}] = tween({}, {}, {})",
            self.id, self.from, self.to, self.tween
        )
    }
}

/// Text variable holding a formatted number
#[derive(Debug, Clone)]
pub struct TextFromFloat {
    pub id: VariableId,
    pub value: FloatSlot,
    pub digits_before: u16,
    pub digits_after: u16,
    pub flags: u32,
    text: String,
}

impl TextFromFloat {
    /// Fraction padded with spaces
    pub const PAD_AFTER_SPACE: u32 = 0;
    /// Trailing fraction zeros removed
    pub const PAD_AFTER_NONE: u32 = 1;
    /// Fraction padded with zeros
    pub const PAD_AFTER_ZERO: u32 = 3;
    /// Integer part padded with spaces
    pub const PAD_PRE_SPACE: u32 = 0;
    /// Integer part not padded
    pub const PAD_PRE_NONE: u32 = 4;
    /// Integer part padded with zeros
    pub const PAD_PRE_ZERO: u32 = 12;

    const PAD_AFTER_MASK: u32 = 3;
    const PAD_PRE_MASK: u32 = 12;

    pub fn new(id: VariableId, value: f32, digits_before: u16, digits_after: u16, flags: u32) -> Self {
        let mut op = Self {
            id,
            value: FloatSlot::new(value),
            digits_before,
            digits_after,
            flags,
            text: String::new(),
        };
        op.text = op.format();
        op
    }

    /// Text produced by the last update
    pub fn text(&self) -> &str {
        &self.text
    }

    fn format(&self) -> String {
        format_float(self.value.get(), self.digits_before, self.digits_after, self.flags)
    }
}

/// Format `value` with at most `before` integer digits (0 = unlimited) and
/// exactly `after` fraction digits, padded per the `TextFromFloat` flags.
pub fn format_float(value: f32, before: u16, after: u16, flags: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let after = u32::from(after.min(9));
    let scale = 10u64.pow(after);
    let negative = value < 0.0;
    let scaled = (f64::from(value).abs() * scale as f64).round() as u64;
    let mut whole = scaled / scale;
    let fraction = scaled % scale;

    if before > 0 && before < 20 {
        whole %= 10u64.pow(u32::from(before));
    }

    let mut out = String::new();
    if negative && scaled != 0 {
        out.push('-');
    }
    let digits = whole.to_string();
    let missing = usize::from(before).saturating_sub(digits.len());
    match flags & TextFromFloat::PAD_PRE_MASK {
        TextFromFloat::PAD_PRE_ZERO => out.extend(std::iter::repeat('0').take(missing)),
        TextFromFloat::PAD_PRE_NONE => {}
        _ => out.extend(std::iter::repeat(' ').take(missing)),
    }
    out.push_str(&digits);

    if after > 0 {
        let fraction = format!("{fraction:0width$}", width = after as usize);
        let significant = fraction.trim_end_matches('0');
        match flags & TextFromFloat::PAD_AFTER_MASK {
            TextFromFloat::PAD_AFTER_ZERO => {
                out.push('.');
                out.push_str(&fraction);
            }
            TextFromFloat::PAD_AFTER_NONE => {
                if !significant.is_empty() {
                    out.push('.');
                    out.push_str(significant);
                }
            }
            _ => {
                out.push('.');
                out.push_str(significant);
                out.extend(std::iter::repeat(' ').take(fraction.len() - significant.len()));
            }
        }
    }
    out
}

impl PartialEq for TextFromFloat {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.value == other.value
            && self.digits_before == other.digits_before
            && self.digits_after == other.digits_after
            && self.flags == other.flags
    }
}

impl Decode for TextFromFloat {
    const OPCODE: u32 = Opcode::TEXT_FROM_FLOAT.raw();
    const NAME: &'static str = "TextFromFloat";
    const SHAPE: RecordShape = RecordShape::Fixed(16);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = read_variable_id(reader, Self::NAME, "id")?;
        let value = reader.read_f32()?;
        let digits = reader.read_u32()?;
        let flags = reader.read_u32()?;
        if flags & !(Self::PAD_AFTER_MASK | Self::PAD_PRE_MASK) != 0 {
            return Err(WireError::InvalidField {
                operation: Self::NAME,
                field: "flags",
                value: i64::from(flags),
            });
        }
        Ok(Self::new(id, value, (digits >> 16) as u16, (digits & 0xFFFF) as u16, flags))
    }
}

impl Operation for TextFromFloat {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.id);
        buffer.write_f32(self.value.raw());
        buffer.write_u32((u32::from(self.digits_before) << 16) | u32::from(self.digits_after));
        buffer.write_u32(self.flags);
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.load_variable(self.id, Variable::Text(self.text.clone()));
    }
}

impl VariableSupport for TextFromFloat {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.value.register(registrar);
        registrar.produces(self.id);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.value.update(resolver);
        self.text = self.format();
    }
}

impl fmt::Display for TextFromFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TextFromFloat[{}] = {} {}.{} flags {}",
            self.id, self.value, self.digits_before, self.digits_after, self.flags
        )
    }
}

/// Text variable holding the concatenation of two text variables
#[derive(Debug, Clone)]
pub struct TextMerge {
    pub id: VariableId,
    pub first: TextSlot,
    pub second: TextSlot,
    text: String,
}

impl TextMerge {
    pub fn new(id: VariableId, first: VariableId, second: VariableId) -> Self {
        Self {
            id,
            first: TextSlot::new(first),
            second: TextSlot::new(second),
            text: String::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl PartialEq for TextMerge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.first == other.first && self.second == other.second
    }
}

impl Decode for TextMerge {
    const OPCODE: u32 = Opcode::TEXT_MERGE.raw();
    const NAME: &'static str = "TextMerge";
    const SHAPE: RecordShape = RecordShape::Fixed(12);

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let id = read_variable_id(reader, Self::NAME, "id")?;
        let first = read_variable_id(reader, Self::NAME, "first")?;
        let second = read_variable_id(reader, Self::NAME, "second")?;
        Ok(Self::new(id, first, second))
    }
}

impl Operation for TextMerge {
    operation_identity!();
    variable_support!();

    fn write(&self, buffer: &mut WireBuffer) {
        buffer.start(Self::OPCODE);
        buffer.write_u32(self.id);
        buffer.write_u32(self.first.id());
        buffer.write_u32(self.second.id());
    }

    fn apply(&self, context: &mut dyn RemoteContext) {
        context.load_variable(self.id, Variable::Text(self.text.clone()));
    }
}

impl VariableSupport for TextMerge {
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar) {
        self.first.register(registrar);
        self.second.register(registrar);
        registrar.produces(self.id);
    }

    fn update_variables(&mut self, resolver: &mut Resolver<'_>) {
        self.first.update(resolver);
        self.second.update(resolver);
        self.text.clear();
        self.text.push_str(self.first.get());
        self.text.push_str(self.second.get());
    }
}

impl fmt::Display for TextMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextMerge[{}] = {} + {}", self.id, self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variables::{float_ref, VariableSource};
    use rstest::rstest;
    use std::collections::HashMap;

    struct Table(HashMap<VariableId, Variable>);

    impl VariableSource for Table {
        fn variable(&self, id: VariableId) -> Option<&Variable> {
            self.0.get(&id)
        }
    }

    #[test]
    fn test_rpn_evaluation() {
        // (2 + 3) * 4
        let expr = FloatExpression::new(
            42,
            vec![2.0, 3.0, MathOperator::Add.as_float(), 4.0, MathOperator::Mul.as_float()],
        )
        .unwrap();
        assert_eq!(expr.value(), 20.0);
    }

    #[test]
    fn test_rpn_operand_order() {
        let expr =
            FloatExpression::new(42, vec![10.0, 4.0, MathOperator::Sub.as_float()]).unwrap();
        assert_eq!(expr.value(), 6.0);
        let expr =
            FloatExpression::new(42, vec![7.0, 60.0, MathOperator::Mod.as_float()]).unwrap();
        assert_eq!(expr.value(), 7.0);
    }

    #[test]
    fn test_rpn_with_variable() {
        let table = Table(HashMap::from([(2, Variable::Float(125.0))]));
        let mut expr =
            FloatExpression::new(42, vec![float_ref(2), 60.0, MathOperator::Mod.as_float()])
                .unwrap();
        expr.update_variables(&mut Resolver::new(&table));
        assert_eq!(expr.value(), 5.0);
    }

    #[rstest]
    #[case(vec![MathOperator::Add.as_float()])]
    #[case(vec![1.0, 2.0])]
    #[case(vec![])]
    #[case(vec![1.0, as_nan(OPERATOR_BASE + 200)])]
    fn test_invalid_expressions_rejected(#[case] expression: Vec<f32>) {
        assert!(FloatExpression::new(42, expression).is_err());
    }

    #[test]
    fn test_expression_registers_operands_not_operators() {
        #[derive(Default)]
        struct Edges(Vec<VariableId>, Vec<VariableId>);
        impl DependencyRegistrar for Edges {
            fn listens_to(&mut self, id: VariableId) {
                self.0.push(id);
            }
            fn produces(&mut self, id: VariableId) {
                self.1.push(id);
            }
        }

        let expr = FloatExpression::new(
            50,
            vec![float_ref(1), float_ref(43), MathOperator::Max.as_float()],
        )
        .unwrap();
        let mut edges = Edges::default();
        expr.register_listening(&mut edges);
        assert_eq!(edges.0, vec![1, 43]);
        assert_eq!(edges.1, vec![50]);
    }

    #[rstest]
    #[case(5.0, 2, 0, TextFromFloat::PAD_PRE_ZERO, "05")]
    #[case(5.0, 2, 0, TextFromFloat::PAD_PRE_SPACE, " 5")]
    #[case(5.0, 2, 0, TextFromFloat::PAD_PRE_NONE, "5")]
    #[case(123.0, 2, 0, TextFromFloat::PAD_PRE_NONE, "23")]
    #[case(3.5, 0, 2, TextFromFloat::PAD_AFTER_ZERO, "3.50")]
    #[case(3.5, 0, 2, TextFromFloat::PAD_AFTER_SPACE, "3.5 ")]
    #[case(3.0, 0, 2, TextFromFloat::PAD_AFTER_NONE, "3")]
    #[case(-1.25, 0, 1, TextFromFloat::PAD_AFTER_ZERO, "-1.3")]
    #[case(9.996, 0, 2, TextFromFloat::PAD_AFTER_ZERO, "10.00")]
    fn test_format_float(
        #[case] value: f32,
        #[case] before: u16,
        #[case] after: u16,
        #[case] flags: u32,
        #[case] expected: &str,
    ) {
        assert_eq!(format_float(value, before, after, flags), expected);
    }

    #[test]
    fn test_text_merge_update() {
        let table = Table(HashMap::from([
            (42, Variable::Text("12".into())),
            (43, Variable::Text(":30".into())),
        ]));
        let mut merge = TextMerge::new(44, 42, 43);
        merge.update_variables(&mut Resolver::new(&table));
        assert_eq!(merge.text(), "12:30");
    }

    #[test]
    fn test_color_interpolation() {
        assert_eq!(interpolate_argb(0xFF000000, 0xFFFFFFFF, 0.5), 0xFF808080);
        assert_eq!(interpolate_argb(0xFF0000FF, 0xFFFF0000, 0.0), 0xFF0000FF);
        assert_eq!(interpolate_argb(0xFF0000FF, 0xFFFF0000, 2.0), 0xFFFF0000);
    }

    #[test]
    fn test_color_expression_wire_round_trip() {
        let expr = ColorExpression::new(60, ColorSlot::literal(0xFF112233), ColorSlot::variable(61), 0.25);
        let mut buffer = WireBuffer::new();
        expr.write(&mut buffer);
        let bytes = buffer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        reader.read_u32().unwrap();
        assert_eq!(ColorExpression::decode(&mut reader).unwrap(), expr);
    }
}
