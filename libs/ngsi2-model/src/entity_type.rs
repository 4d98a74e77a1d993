use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of an attribute within an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    #[serde(rename = "type")]
    pub attr_type: String,
}

impl AttributeType {
    pub fn new(attr_type: impl Into<String>) -> Self {
        Self {
            attr_type: attr_type.into(),
        }
    }
}

/// An entity type: its attribute types and the number of entities of that type.
///
/// `entity_type` is only filled in by list responses (`GET /v2/types`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityType {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, AttributeType>,
    #[serde(default)]
    pub count: u64,
}
