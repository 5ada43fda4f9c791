//! Canonical, serializable snapshots of the replay context

use std::collections::BTreeMap;

use recompose_wire::operations::ClickArea;
use recompose_wire::{Variable, VariableId};
use serde::{Deserialize, Serialize};

use crate::context::PlayerContext;
use crate::error::Result;

/// A variable value; colors are written as `#AARRGGBB`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VariableValue {
    /// Non-finite values are written as `"NaN"`, `"inf"` or `"-inf"`
    Float(#[serde(with = "named_non_finite")] f32),
    Color(String),
    Text(String),
}

/// JSON has no NaN or infinity, so those travel as strings
mod named_non_finite {
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f32),
        Name(String),
    }

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Name(name) => match name.as_str() {
                "NaN" => Ok(f32::NAN),
                "inf" => Ok(f32::INFINITY),
                "-inf" => Ok(f32::NEG_INFINITY),
                other => Err(de::Error::invalid_value(
                    de::Unexpected::Str(other),
                    &"a number, \"NaN\", \"inf\" or \"-inf\"",
                )),
            },
        }
    }
}

impl From<&Variable> for VariableValue {
    fn from(variable: &Variable) -> Self {
        match variable {
            Variable::Float(value) => VariableValue::Float(*value),
            Variable::Color(color) => VariableValue::Color(format!("#{color:08X}")),
            Variable::Text(text) => VariableValue::Text(text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSnapshot {
    pub version: String,
    pub width: u32,
    pub height: u32,
    pub capabilities: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickAreaSnapshot {
    pub id: i32,
    /// Resolved left, top, right, bottom
    pub rect: [f32; 4],
    #[serde(default)]
    pub content_description: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertiesSnapshot {
    #[serde(default)]
    pub header: Option<HeaderSnapshot>,
    #[serde(default)]
    pub theme: Option<i32>,
    /// Scroll, alignment, sizing, mode
    #[serde(default)]
    pub root_content_behavior: Option<[i32; 4]>,
    #[serde(default)]
    pub root_content_description: Option<String>,
    /// Sorted by id
    #[serde(default)]
    pub click_areas: Vec<ClickAreaSnapshot>,
}

/// Context state after a frame (canonical: sorted keys)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub frame: u64,
    pub variables: BTreeMap<VariableId, VariableValue>,
    pub properties: PropertiesSnapshot,
}

impl StateSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn described(context: &PlayerContext, id: VariableId) -> Option<String> {
    (id != 0).then(|| context.text(id)).flatten().map(str::to_owned)
}

fn click_area(context: &PlayerContext, area: &ClickArea) -> ClickAreaSnapshot {
    ClickAreaSnapshot {
        id: area.id,
        rect: [area.left.get(), area.top.get(), area.right.get(), area.bottom.get()],
        content_description: described(context, area.content_description),
        metadata: described(context, area.metadata),
    }
}

/// Build a canonical snapshot from a live context
pub fn snapshot_from_context(context: &PlayerContext, frame: u64) -> StateSnapshot {
    let variables = context
        .variables()
        .map(|(id, value)| (id, VariableValue::from(value)))
        .collect();

    let properties = context.properties();
    let mut click_areas: Vec<ClickAreaSnapshot> = properties
        .click_areas
        .iter()
        .map(|area| click_area(context, area))
        .collect();
    click_areas.sort_by_key(|area| area.id);

    StateSnapshot {
        frame,
        variables,
        properties: PropertiesSnapshot {
            header: properties.header.map(|header| HeaderSnapshot {
                version: format!("{}.{}.{}", header.major, header.minor, header.patch),
                width: header.width,
                height: header.height,
                capabilities: header.capabilities,
            }),
            theme: properties.theme,
            root_content_behavior: properties
                .root_content_behavior
                .map(|b| [b.scroll, b.alignment, b.sizing, b.mode]),
            root_content_description: properties
                .root_content_description
                .and_then(|id| described(context, id)),
            click_areas,
        },
    }
}

/// Serialize the context to a canonical JSON string
pub fn serialize_state_to_json(context: &PlayerContext, frame: u64) -> Result<String> {
    snapshot_from_context(context, frame).to_json()
}

pub fn deserialize_state_from_json(json: &str) -> Result<StateSnapshot> {
    Ok(serde_json::from_str(json)?)
}
