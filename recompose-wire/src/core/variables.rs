//! Variables and variable-bound parameter slots
//!
//! Operations may carry indirect values: a float parameter whose bit pattern is
//! a tagged NaN refers to a variable owned by the replay context. The slot types
//! here keep the wire value next to a cached resolved value that the update pass
//! refreshes before every replay.

use std::fmt;

use crate::core::operation::DependencyRegistrar;

/// Identifier of a context-owned variable
pub type VariableId = u32;

/// Sign bit plus all exponent bits: a NaN with the id in the mantissa
pub const NAN_TAG: u32 = 0xFF80_0000;

/// Largest id that fits the NaN mantissa
pub const MAX_REFERENCE_ID: u32 = 0x007F_FFFF;

/// Mantissa values at or above this are expression operators, not variables
pub const OPERATOR_BASE: u32 = 0x0031_0000;

/// First id handed out to document-declared variables
pub const FIRST_USER_ID: VariableId = 42;

/// Variables maintained by the replay context itself
pub mod system {
    use super::VariableId;

    /// Seconds since the player started, fractional
    pub const CONTINUOUS_SEC: VariableId = 1;
    /// Whole seconds since midnight
    pub const TIME_IN_SEC: VariableId = 2;
    /// Whole minutes since midnight
    pub const TIME_IN_MIN: VariableId = 3;
    /// Whole hours since midnight
    pub const TIME_IN_HR: VariableId = 4;
    pub const WINDOW_WIDTH: VariableId = 5;
    pub const WINDOW_HEIGHT: VariableId = 6;
    pub const COMPONENT_WIDTH: VariableId = 7;
    pub const COMPONENT_HEIGHT: VariableId = 8;

    pub const ALL: [VariableId; 8] = [
        CONTINUOUS_SEC,
        TIME_IN_SEC,
        TIME_IN_MIN,
        TIME_IN_HR,
        WINDOW_WIDTH,
        WINDOW_HEIGHT,
        COMPONENT_WIDTH,
        COMPONENT_HEIGHT,
    ];

    pub fn name(id: VariableId) -> Option<&'static str> {
        Some(match id {
            CONTINUOUS_SEC => "CONTINUOUS_SEC",
            TIME_IN_SEC => "TIME_IN_SEC",
            TIME_IN_MIN => "TIME_IN_MIN",
            TIME_IN_HR => "TIME_IN_HR",
            WINDOW_WIDTH => "WINDOW_WIDTH",
            WINDOW_HEIGHT => "WINDOW_HEIGHT",
            COMPONENT_WIDTH => "COMPONENT_WIDTH",
            COMPONENT_HEIGHT => "COMPONENT_HEIGHT",
            _ => return None,
        })
    }
}

/// Encode a reference id as a tagged NaN
pub fn as_nan(id: u32) -> f32 {
    f32::from_bits(NAN_TAG | (id & MAX_REFERENCE_ID))
}

/// Mantissa of a tagged NaN, or `None` for ordinary floats and untagged NaNs
pub fn reference_from_nan(value: f32) -> Option<u32> {
    let bits = value.to_bits();
    let payload = bits & MAX_REFERENCE_ID;
    (bits & NAN_TAG == NAN_TAG && payload != 0).then_some(payload)
}

/// Variable id carried by a float, if it is a variable reference
pub fn variable_from_nan(value: f32) -> Option<VariableId> {
    reference_from_nan(value).filter(|id| *id < OPERATOR_BASE)
}

/// Float parameter that refers to variable `id`
pub fn float_ref(id: VariableId) -> f32 {
    as_nan(id)
}

/// Kinds of value a variable can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Float,
    Color,
    Text,
}

/// A context-owned dynamic value
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Float(f32),
    /// ARGB
    Color(u32),
    Text(String),
}

impl Variable {
    pub fn kind(&self) -> VariableKind {
        match self {
            Variable::Float(_) => VariableKind::Float,
            Variable::Color(_) => VariableKind::Color,
            Variable::Text(_) => VariableKind::Text,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Float(v) => write!(f, "{v}"),
            Variable::Color(c) => write!(f, "#{c:08X}"),
            Variable::Text(t) => write!(f, "{t:?}"),
        }
    }
}

/// Read access to the variable table during the update pass
pub trait VariableSource {
    fn variable(&self, id: VariableId) -> Option<&Variable>;
}

/// Looks up variables for one operation's update and remembers every id
/// that could not be resolved with the expected kind.
pub struct Resolver<'a> {
    source: &'a dyn VariableSource,
    unresolved: Vec<VariableId>,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn VariableSource) -> Self {
        Self {
            source,
            unresolved: Vec::new(),
        }
    }

    pub fn float(&mut self, id: VariableId) -> Option<f32> {
        match self.source.variable(id) {
            Some(Variable::Float(v)) => Some(*v),
            _ => self.miss(id),
        }
    }

    pub fn color(&mut self, id: VariableId) -> Option<u32> {
        match self.source.variable(id) {
            Some(Variable::Color(c)) => Some(*c),
            _ => self.miss(id),
        }
    }

    pub fn text(&mut self, id: VariableId) -> Option<&'a str> {
        let source = self.source;
        match source.variable(id) {
            Some(Variable::Text(t)) => Some(t.as_str()),
            _ => self.miss(id),
        }
    }

    fn miss<T>(&mut self, id: VariableId) -> Option<T> {
        self.unresolved.push(id);
        None
    }

    pub fn unresolved(&self) -> &[VariableId] {
        &self.unresolved
    }

    pub fn into_unresolved(self) -> Vec<VariableId> {
        self.unresolved
    }
}

/// Float parameter as read from the wire plus its resolved value
#[derive(Debug, Clone, Copy)]
pub struct FloatSlot {
    raw: f32,
    value: f32,
}

impl FloatSlot {
    pub fn new(raw: f32) -> Self {
        let value = if variable_from_nan(raw).is_some() { 0.0 } else { raw };
        Self { raw, value }
    }

    pub fn variable(id: VariableId) -> Self {
        Self::new(as_nan(id))
    }

    /// Value exactly as encoded
    pub fn raw(&self) -> f32 {
        self.raw
    }

    /// Resolved value; the literal itself when the slot holds no reference
    pub fn get(&self) -> f32 {
        self.value
    }

    pub fn variable_id(&self) -> Option<VariableId> {
        variable_from_nan(self.raw)
    }

    pub fn register(&self, registrar: &mut dyn DependencyRegistrar) {
        if let Some(id) = self.variable_id() {
            registrar.listens_to(id);
        }
    }

    /// Refresh the cached value; an unresolved variable keeps the previous one
    pub fn update(&mut self, resolver: &mut Resolver<'_>) {
        if let Some(id) = self.variable_id() {
            if let Some(value) = resolver.float(id) {
                self.value = value;
            }
        }
    }
}

impl From<f32> for FloatSlot {
    fn from(raw: f32) -> Self {
        Self::new(raw)
    }
}

/// Slots compare by wire bits, so NaN literals equal themselves
impl PartialEq for FloatSlot {
    fn eq(&self, other: &Self) -> bool {
        self.raw.to_bits() == other.raw.to_bits()
    }
}

impl fmt::Display for FloatSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variable_id() {
            Some(id) => write!(f, "[{id}]"),
            None => write!(f, "{}", self.raw),
        }
    }
}

/// Where a color parameter comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    Literal(u32),
    Variable(VariableId),
}

/// Color parameter plus its resolved ARGB value
#[derive(Debug, Clone, Copy)]
pub struct ColorSlot {
    source: ColorSource,
    value: u32,
}

/// Opaque black, used until a color variable resolves
pub const DEFAULT_COLOR: u32 = 0xFF00_0000;

impl ColorSlot {
    pub fn literal(color: u32) -> Self {
        Self {
            source: ColorSource::Literal(color),
            value: color,
        }
    }

    pub fn variable(id: VariableId) -> Self {
        Self {
            source: ColorSource::Variable(id),
            value: DEFAULT_COLOR,
        }
    }

    pub fn source(&self) -> ColorSource {
        self.source
    }

    pub fn get(&self) -> u32 {
        self.value
    }

    pub fn variable_id(&self) -> Option<VariableId> {
        match self.source {
            ColorSource::Variable(id) => Some(id),
            ColorSource::Literal(_) => None,
        }
    }

    pub fn register(&self, registrar: &mut dyn DependencyRegistrar) {
        if let Some(id) = self.variable_id() {
            registrar.listens_to(id);
        }
    }

    pub fn update(&mut self, resolver: &mut Resolver<'_>) {
        if let Some(id) = self.variable_id() {
            if let Some(color) = resolver.color(id) {
                self.value = color;
            }
        }
    }
}

impl PartialEq for ColorSlot {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for ColorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            ColorSource::Literal(c) => write!(f, "#{c:08X}"),
            ColorSource::Variable(id) => write!(f, "[{id}]"),
        }
    }
}

/// Reference to a text variable plus its resolved contents
#[derive(Debug, Clone)]
pub struct TextSlot {
    id: VariableId,
    value: String,
}

impl TextSlot {
    pub fn new(id: VariableId) -> Self {
        Self {
            id,
            value: String::new(),
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn get(&self) -> &str {
        &self.value
    }

    pub fn register(&self, registrar: &mut dyn DependencyRegistrar) {
        registrar.listens_to(self.id);
    }

    pub fn update(&mut self, resolver: &mut Resolver<'_>) {
        if let Some(text) = resolver.text(self.id) {
            if text != self.value {
                self.value.clear();
                self.value.push_str(text);
            }
        }
    }
}

impl PartialEq for TextSlot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for TextSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Table(HashMap<VariableId, Variable>);

    impl VariableSource for Table {
        fn variable(&self, id: VariableId) -> Option<&Variable> {
            self.0.get(&id)
        }
    }

    #[test]
    fn test_nan_reference_encoding() {
        let value = as_nan(42);
        assert!(value.is_nan());
        assert_eq!(variable_from_nan(value), Some(42));
        assert_eq!(variable_from_nan(1.5), None);
        assert_eq!(variable_from_nan(f32::NAN), None);
        // -NaN has a mantissa above the operator range
        assert_eq!(variable_from_nan(-f32::NAN), None);
        assert_eq!(variable_from_nan(as_nan(OPERATOR_BASE + 1)), None);
    }

    #[test]
    fn test_float_slot_resolution() {
        let table = Table(HashMap::from([(42, Variable::Float(3.0))]));
        let mut slot = FloatSlot::variable(42);
        assert_eq!(slot.get(), 0.0);

        let mut resolver = Resolver::new(&table);
        slot.update(&mut resolver);
        assert_eq!(slot.get(), 3.0);
        assert!(resolver.unresolved().is_empty());
    }

    #[test]
    fn test_unresolved_keeps_previous_value() {
        let table = Table(HashMap::from([(7, Variable::Text("x".into()))]));
        let mut slot = FloatSlot::variable(7);
        let mut resolver = Resolver::new(&table);
        slot.update(&mut resolver);
        assert_eq!(slot.get(), 0.0);
        assert_eq!(resolver.into_unresolved(), vec![7]);
    }

    #[test]
    fn test_literal_nan_slot_equality() {
        let a = FloatSlot::new(f32::NAN);
        let b = FloatSlot::new(f32::NAN);
        assert_eq!(a, b);
        assert_eq!(a.variable_id(), None);
        assert!(a.get().is_nan());
    }

    #[test]
    fn test_text_slot_update() {
        let table = Table(HashMap::from([(50, Variable::Text("12:30".into()))]));
        let mut slot = TextSlot::new(50);
        slot.update(&mut Resolver::new(&table));
        assert_eq!(slot.get(), "12:30");
    }
}
