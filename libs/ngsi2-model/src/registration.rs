//! Context provider registrations.

use crate::entity::Metadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Entity selector used by registrations, subscriptions and bulk queries.
///
/// Either `id` or `id_pattern` (and either `entity_type` or `type_pattern`)
/// is normally set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_pattern: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_pattern: Option<String>,
}

impl SubjectEntity {
    /// Select one entity by id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Select entities whose id matches a regular expression.
    pub fn with_id_pattern(pattern: impl Into<String>) -> Self {
        Self {
            id_pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn of_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    #[must_use]
    pub fn of_type_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.type_pattern = Some(pattern.into());
        self
    }
}

/// What a registration covers: entities and, optionally, a subset of attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default)]
    pub entities: Vec<SubjectEntity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl Subject {
    pub fn new(entities: Vec<SubjectEntity>, attributes: Vec<String>) -> Self {
        Self {
            entities,
            attributes,
        }
    }
}

/// A context provider registration.
///
/// `id` is assigned by the broker and absent when creating one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub subject: Subject,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Metadata>,
    pub callback: Url,
    /// ISO 8601 duration, e.g. `PT1M`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Registration {
    pub fn new(callback: Url) -> Self {
        Self {
            id: None,
            subject: Subject::default(),
            metadata: BTreeMap::new(),
            callback,
            duration: None,
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = subject;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, name: impl Into<String>, metadata: Metadata) -> Self {
        self.metadata.insert(name.into(), metadata);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather_registration() -> Registration {
        let mut registration =
            Registration::new(Url::parse("http://weather.example.com/ngsi").unwrap())
                .with_duration("PT1M")
                .with_subject(Subject::new(
                    vec![SubjectEntity::with_id("Bcn_Welt").of_type("Room")],
                    vec!["temperature".to_owned()],
                ))
                .with_metadata(
                    "providingService",
                    Metadata::new("weather.example.com").with_type("none"),
                )
                .with_metadata(
                    "providingAuthority",
                    Metadata::new("AEMET - Spain").with_type("none"),
                );
        registration.id = Some("abcdefg".to_owned());
        registration
    }

    #[test]
    fn registration_wire_format() {
        let value = serde_json::to_value(weather_registration()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "abcdefg",
                "subject": {
                    "entities": [{"id": "Bcn_Welt", "type": "Room"}],
                    "attributes": ["temperature"]
                },
                "metadata": {
                    "providingAuthority": {"value": "AEMET - Spain", "type": "none"},
                    "providingService": {"value": "weather.example.com", "type": "none"}
                },
                "callback": "http://weather.example.com/ngsi",
                "duration": "PT1M"
            })
        );
        let back: Registration = serde_json::from_value(value).unwrap();
        assert_eq!(back, weather_registration());
    }

    #[test]
    fn subject_entity_patterns() {
        let entity = SubjectEntity::with_id_pattern("Room.*").of_type_pattern("R.*");
        assert_eq!(
            serde_json::to_value(entity).unwrap(),
            json!({"idPattern": "Room.*", "typePattern": "R.*"})
        );
    }

    #[test]
    fn new_registration_has_no_id() {
        let registration = Registration::new(Url::parse("http://localhost:1028/accumulate").unwrap());
        let value = serde_json::to_value(registration).unwrap();
        assert_eq!(
            value,
            json!({"subject": {"entities": []}, "callback": "http://localhost:1028/accumulate"})
        );
    }
}
