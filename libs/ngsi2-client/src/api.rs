use crate::error::Ngsi2Error;
use crate::query::{EntityQuery, Pagination};
use async_trait::async_trait;
use ngsi2_model::{
    Attribute, BulkQueryRequest, BulkRegisterRequest, BulkUpdateRequest, Entity, EntityType,
    Paginated, Registration, Subscription,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// NGSIv2 context broker operations.
///
/// `entity_type` arguments disambiguate entities sharing an id; `None` or
/// an empty string leaves the `type` parameter out.
///
/// Implemented by [`Ngsi2Client`](crate::Ngsi2Client). Depend on the trait
/// to substitute a fake broker in tests.
#[async_trait]
pub trait Ngsi2Api: Send + Sync {
    /// `GET /v2`: the resource index (`entities_url`, `types_url`, ...).
    /// Non-string entries are skipped.
    async fn get_v2(&self) -> Result<BTreeMap<String, String>, Ngsi2Error>;

    // Entities

    async fn get_entities(&self, query: &EntityQuery) -> Result<Paginated<Entity>, Ngsi2Error>;

    async fn add_entity(&self, entity: &Entity) -> Result<(), Ngsi2Error>;

    async fn get_entity(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attrs: &[String],
    ) -> Result<Entity, Ngsi2Error>;

    /// Update attributes; with `append` missing attributes are created.
    async fn update_entity(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attributes: &BTreeMap<String, Attribute>,
        append: bool,
    ) -> Result<(), Ngsi2Error>;

    /// Replace all attributes of an entity.
    async fn replace_entity(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attributes: &BTreeMap<String, Attribute>,
    ) -> Result<(), Ngsi2Error>;

    async fn delete_entity(&self, entity_id: &str, entity_type: Option<&str>)
    -> Result<(), Ngsi2Error>;

    // Attributes

    async fn get_attribute(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
    ) -> Result<Attribute, Ngsi2Error>;

    async fn update_attribute(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
        attribute: &Attribute,
    ) -> Result<(), Ngsi2Error>;

    async fn delete_attribute(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
    ) -> Result<(), Ngsi2Error>;

    /// Attribute value as JSON.
    async fn get_attribute_value(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
    ) -> Result<Value, Ngsi2Error>;

    /// Attribute value as the broker renders it in `text/plain`.
    async fn get_attribute_value_as_string(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
    ) -> Result<String, Ngsi2Error>;

    // Entity types

    async fn get_entity_types(
        &self,
        pagination: Pagination,
    ) -> Result<Paginated<EntityType>, Ngsi2Error>;

    async fn get_entity_type(&self, entity_type: &str) -> Result<EntityType, Ngsi2Error>;

    // Registrations

    async fn get_registrations(&self) -> Result<Vec<Registration>, Ngsi2Error>;

    /// Returns the id the broker assigned.
    async fn add_registration(&self, registration: &Registration) -> Result<String, Ngsi2Error>;

    async fn get_registration(&self, registration_id: &str) -> Result<Registration, Ngsi2Error>;

    async fn update_registration(
        &self,
        registration_id: &str,
        registration: &Registration,
    ) -> Result<(), Ngsi2Error>;

    async fn delete_registration(&self, registration_id: &str) -> Result<(), Ngsi2Error>;

    // Subscriptions

    async fn get_subscriptions(
        &self,
        pagination: Pagination,
    ) -> Result<Paginated<Subscription>, Ngsi2Error>;

    /// Returns the id the broker assigned.
    async fn add_subscription(&self, subscription: &Subscription) -> Result<String, Ngsi2Error>;

    async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription, Ngsi2Error>;

    async fn update_subscription(
        &self,
        subscription_id: &str,
        subscription: &Subscription,
    ) -> Result<(), Ngsi2Error>;

    async fn delete_subscription(&self, subscription_id: &str) -> Result<(), Ngsi2Error>;

    // Batch operations

    async fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<(), Ngsi2Error>;

    async fn bulk_query(
        &self,
        request: &BulkQueryRequest,
        order_by: &[String],
        pagination: Pagination,
    ) -> Result<Paginated<Entity>, Ngsi2Error>;

    /// Returns the ids of the registrations the broker created or touched.
    async fn bulk_register(&self, request: &BulkRegisterRequest) -> Result<Vec<String>, Ngsi2Error>;

    async fn bulk_discover(
        &self,
        request: &BulkQueryRequest,
        pagination: Pagination,
    ) -> Result<Paginated<Registration>, Ngsi2Error>;
}
