//! Request bodies for the `/v2/op/*` batch operations.

use crate::entity::Entity;
use crate::registration::{Registration, SubjectEntity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How `POST /v2/op/update` applies the given entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateAction {
    /// Create entities or add/overwrite attributes
    Append,
    /// Like `Append`, but fail on attributes that already exist
    AppendStrict,
    /// Update existing attributes only
    Update,
    /// Delete the listed attributes, or whole entities when none are listed
    Delete,
    /// Replace all attributes of existing entities
    Replace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest {
    pub action_type: UpdateAction,
    pub entities: Vec<Entity>,
}

impl BulkUpdateRequest {
    pub fn new(action_type: UpdateAction, entities: Vec<Entity>) -> Self {
        Self {
            action_type,
            entities,
        }
    }
}

/// Query restriction, e.g. a geographical scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(rename = "type")]
    pub scope_type: String,
    pub value: Value,
}

/// Body of `POST /v2/op/query` and `POST /v2/op/discover`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BulkQueryRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<SubjectEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<Scope>,
}

impl BulkQueryRequest {
    pub fn new(entities: Vec<SubjectEntity>) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope_type: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scopes.push(Scope {
            scope_type: scope_type.into(),
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegisterAction {
    Create,
    Update,
    Delete,
}

/// Body of `POST /v2/op/register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRegisterRequest {
    pub action_type: RegisterAction,
    pub registrations: Vec<Registration>,
}

impl BulkRegisterRequest {
    pub fn new(action_type: RegisterAction, registrations: Vec<Registration>) -> Self {
        Self {
            action_type,
            registrations,
        }
    }
}
