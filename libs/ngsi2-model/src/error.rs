//! NGSIv2 error payload.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Error body returned by a context broker on non-2xx responses.
///
/// ```json
/// {"error": "NotFound", "description": "The requested entity has not been found. Check type and id"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absent and `null` both read as empty.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub affected_items: Vec<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            description: None,
            affected_items: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_affected_items(mut self, items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.affected_items = items.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)?;
        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }
        if !self.affected_items.is_empty() {
            write!(f, " (affected: {})", self.affected_items.join(", "))?;
        }
        Ok(())
    }
}
