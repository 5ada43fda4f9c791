//! The replay context: variable table, document properties and frame clock

use ahash::AHashMap;
use recompose_wire::core::variables::system;
use recompose_wire::operations::{ClickArea, Header, RootContentBehavior};
use recompose_wire::{DocumentProperty, RemoteContext, Variable, VariableId, VariableSource};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Time inputs for one frame
///
/// The clock is supplied by the caller so that a replay is reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    /// Seconds since the player started
    pub elapsed: f64,
    /// Wall-clock seconds since midnight
    pub since_midnight: f64,
}

impl FrameClock {
    pub fn new(elapsed: f64, since_midnight: f64) -> Self {
        Self {
            elapsed,
            since_midnight: since_midnight.rem_euclid(SECONDS_PER_DAY),
        }
    }

    /// First frame of a replay starting at the given time of day
    pub fn at_time_of_day(since_midnight: f64) -> Self {
        Self::new(0.0, since_midnight)
    }

    /// The clock `step` seconds later
    pub fn advanced(&self, step: f64) -> Self {
        Self::new(self.elapsed + step, self.since_midnight + step)
    }

    pub fn seconds(&self) -> f32 {
        self.since_midnight.floor() as f32
    }

    pub fn minutes(&self) -> f32 {
        (self.since_midnight / 60.0).floor() as f32
    }

    pub fn hours(&self) -> f32 {
        (self.since_midnight / 3600.0).floor() as f32
    }
}

/// Document-level state set by protocol operations during replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentProperties {
    pub header: Option<Header>,
    pub theme: Option<i32>,
    pub root_content_behavior: Option<RootContentBehavior>,
    pub root_content_description: Option<VariableId>,
    /// Click areas by id, in first-seen order
    pub click_areas: Vec<ClickArea>,
}

impl DocumentProperties {
    fn set(&mut self, property: DocumentProperty) {
        match property {
            DocumentProperty::Header(header) => self.header = Some(header),
            DocumentProperty::Theme(theme) => self.theme = Some(theme),
            DocumentProperty::RootContentBehavior(behavior) => {
                self.root_content_behavior = Some(behavior)
            }
            DocumentProperty::RootContentDescription(id) => {
                self.root_content_description = Some(id)
            }
            DocumentProperty::ClickArea(area) => {
                match self.click_areas.iter_mut().find(|a| a.id == area.id) {
                    Some(existing) => *existing = area,
                    None => self.click_areas.push(area),
                }
            }
        }
    }
}

/// Variable table and document state owned by one replay pipeline
#[derive(Debug, Clone, Default)]
pub struct PlayerContext {
    variables: AHashMap<VariableId, Variable>,
    properties: DocumentProperties,
    window_size: (f32, f32),
    component_size: (f32, f32),
}

impl PlayerContext {
    /// A context with every system variable defined
    pub fn new(window_size: (f32, f32), component_size: (f32, f32)) -> Self {
        let mut context = Self {
            variables: AHashMap::new(),
            properties: DocumentProperties::default(),
            window_size,
            component_size,
        };
        context.begin_frame(&FrameClock::default());
        context
    }

    /// Refresh the system variables for a new frame
    pub fn begin_frame(&mut self, clock: &FrameClock) {
        let (window_width, window_height) = self.window_size;
        let (component_width, component_height) = self.component_size;
        for (id, value) in [
            (system::CONTINUOUS_SEC, clock.elapsed as f32),
            (system::TIME_IN_SEC, clock.seconds()),
            (system::TIME_IN_MIN, clock.minutes()),
            (system::TIME_IN_HR, clock.hours()),
            (system::WINDOW_WIDTH, window_width),
            (system::WINDOW_HEIGHT, window_height),
            (system::COMPONENT_WIDTH, component_width),
            (system::COMPONENT_HEIGHT, component_height),
        ] {
            self.variables.insert(id, Variable::Float(value));
        }
    }

    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.window_size = (width, height);
    }

    pub fn float(&self, id: VariableId) -> Option<f32> {
        match self.variables.get(&id) {
            Some(Variable::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn color(&self, id: VariableId) -> Option<u32> {
        match self.variables.get(&id) {
            Some(Variable::Color(color)) => Some(*color),
            _ => None,
        }
    }

    pub fn text(&self, id: VariableId) -> Option<&str> {
        match self.variables.get(&id) {
            Some(Variable::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> + '_ {
        self.variables.iter().map(|(id, value)| (*id, value))
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }
}

impl VariableSource for PlayerContext {
    fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(&id)
    }
}

impl RemoteContext for PlayerContext {
    fn load_variable(&mut self, id: VariableId, value: Variable) {
        self.variables.insert(id, value);
    }

    fn set_property(&mut self, property: DocumentProperty) {
        self.properties.set(property);
    }
}
