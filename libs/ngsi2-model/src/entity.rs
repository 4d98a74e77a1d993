//! Entities and their attributes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A context entity.
///
/// Attributes are flattened next to `id` and `type` on the wire:
/// `{"id":"Bcn-Welt","type":"Room","temperature":{"value":21.7}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Attribute>,
}

impl Entity {
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add or replace an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

/// An entity attribute: a dynamically typed value, an optional declared
/// type and named metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub attr_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Metadata>,
}

impl Attribute {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            attr_type: None,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, attr_type: impl Into<String>) -> Self {
        self.attr_type = Some(attr_type.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, metadata: Metadata) -> Self {
        self.metadata.insert(name.into(), metadata);
        self
    }
}

/// Attribute metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub metadata_type: Option<String>,
}

impl Metadata {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            metadata_type: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, metadata_type: impl Into<String>) -> Self {
        self.metadata_type = Some(metadata_type.into());
        self
    }
}
