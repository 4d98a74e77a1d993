//! Subscriptions: broker-side notification rules.

use crate::registration::SubjectEntity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Subscription lifecycle state as reported by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Inactive,
}

/// Representation of entities in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttrsFormat {
    Normalized,
    KeyValues,
    Values,
    Legacy,
}

/// Trigger condition: attribute changes and an optional filter expression.
///
/// `expression` keys follow the query-string filters: `q`, `georel`,
/// `geometry`, `coords`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expression: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubscriptionSubject {
    #[serde(default)]
    pub entities: Vec<SubjectEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

/// Where and how notifications are delivered.
///
/// `times_sent` and `last_notification` are read-only fields maintained by
/// the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    pub callback: Url,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs_format: Option<AttrsFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttling: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times_sent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notification: Option<String>,
}

impl Notification {
    pub fn new(callback: Url) -> Self {
        Self {
            attributes: Vec::new(),
            callback,
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            attrs_format: None,
            throttling: None,
            times_sent: None,
            last_notification: None,
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_attrs_format(mut self, format: AttrsFormat) -> Self {
        self.attrs_format = Some(format);
        self
    }
}

/// A subscription. `id` is assigned by the broker.
///
/// `expires` is kept as the ISO 8601 string the broker sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub subject: SubscriptionSubject,
    pub notification: Notification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttling: Option<u64>,
}

impl Subscription {
    pub fn new(subject: SubscriptionSubject, notification: Notification) -> Self {
        Self {
            id: None,
            subject,
            notification,
            expires: None,
            status: None,
            throttling: None,
        }
    }

    #[must_use]
    pub fn with_expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    #[must_use]
    pub fn with_throttling(mut self, seconds: u64) -> Self {
        self.throttling = Some(seconds);
        self
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn broker_subscription_parses() {
        let sub: Subscription = serde_json::from_value(json!({
            "id": "abcdefg",
            "subject": {
                "entities": [{"id": "Bcn_Welt", "type": "Room"}],
                "condition": {
                    "attributes": ["temperature"],
                    "expression": {"q": "temperature>40"}
                }
            },
            "notification": {
                "attributes": ["temperature", "humidity"],
                "callback": "http://localhost:1234/",
                "headers": {"X-MyHeader": "foo"},
                "query": {"authToken": "bar"},
                "attrsFormat": "keyValues",
                "throttling": 5,
                "timesSent": 12,
                "lastNotification": "2015-10-05T16:00:00.10Z"
            },
            "expires": "2016-04-05T14:00:00.20Z",
            "status": "active",
            "throttling": 5
        }))
        .unwrap();

        assert_eq!(sub.id.as_deref(), Some("abcdefg"));
        assert_eq!(sub.status, Some(SubscriptionStatus::Active));
        assert_eq!(sub.notification.attrs_format, Some(AttrsFormat::KeyValues));
        assert_eq!(sub.notification.times_sent, Some(12));
        let condition = sub.subject.condition.as_ref().unwrap();
        assert_eq!(condition.expression["q"], "temperature>40");

        let back: Subscription = serde_json::from_value(serde_json::to_value(&sub).unwrap()).unwrap();
        assert_eq!(back, sub);
    }

    #[test]
    fn new_subscription_is_minimal() {
        let sub = Subscription::new(
            SubscriptionSubject {
                entities: vec![SubjectEntity::with_id_pattern(".*").of_type("Room")],
                condition: Some(Condition {
                    attributes: vec!["temperature".to_owned()],
                    expression: BTreeMap::new(),
                }),
            },
            Notification::new(Url::parse("http://localhost:1028/accumulate").unwrap())
                .with_attributes(["temperature"]),
        )
        .with_throttling(5);

        assert_eq!(
            serde_json::to_value(sub).unwrap(),
            json!({
                "subject": {
                    "entities": [{"idPattern": ".*", "type": "Room"}],
                    "condition": {"attributes": ["temperature"]}
                },
                "notification": {
                    "attributes": ["temperature"],
                    "callback": "http://localhost:1028/accumulate"
                },
                "throttling": 5
            })
        );
    }

    #[test]
    fn status_values() {
        assert_eq!(
            serde_json::to_string(&SubscriptionStatus::Inactive).unwrap(),
            r#""inactive""#
        );
        let expired: SubscriptionStatus = serde_json::from_str(r#""expired""#).unwrap();
        assert_eq!(expired, SubscriptionStatus::Expired);
    }
}
