#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! NGSIv2 data model
//!
//! Plain serde records for the FIWARE NGSIv2 context-management API:
//! - [`Entity`], [`Attribute`], [`Metadata`]
//! - [`EntityType`], [`AttributeType`]
//! - [`Registration`], [`Subject`], [`SubjectEntity`]
//! - [`Subscription`] and its subject, condition and notification parts
//! - [`GeoQuery`] for geographical filtering
//! - Bulk operation requests ([`BulkUpdateRequest`], [`BulkQueryRequest`], [`BulkRegisterRequest`])
//! - [`Paginated`] collections and the broker [`ErrorBody`]
//!
//! The types carry no validation; the context broker is the authority on
//! what it accepts.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod bulk;
pub mod entity;
pub mod entity_type;
pub mod error;
pub mod geo;
pub mod paginated;
pub mod registration;
pub mod subscription;

pub use bulk::{
    BulkQueryRequest, BulkRegisterRequest, BulkUpdateRequest, RegisterAction, Scope, UpdateAction,
};
pub use entity::{Attribute, Entity, Metadata};
pub use entity_type::{AttributeType, EntityType};
pub use error::ErrorBody;
pub use geo::{Coordinate, DistanceModifier, GeoQuery, GeoRelation, Geometry, ParseGeoError};
pub use paginated::Paginated;
pub use registration::{Registration, Subject, SubjectEntity};
pub use subscription::{
    AttrsFormat, Condition, Notification, Subscription, SubscriptionStatus, SubscriptionSubject,
};
