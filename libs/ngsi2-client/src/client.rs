use crate::api::Ngsi2Api;
use crate::config::ClientConfig;
use crate::error::Ngsi2Error;
use crate::headers::{
    FIWARE_SERVICE, FIWARE_SERVICE_PATH, extract_id_from_location, extract_total_count,
};
use crate::query::{EntityQuery, Pagination, QueryParams};
use async_trait::async_trait;
use http::Method;
use http::header::ACCEPT;
use ngsi2_http::{HttpClient, HttpResponse, RequestBuilder, TransportSecurity};
use ngsi2_model::{
    Attribute, BulkQueryRequest, BulkRegisterRequest, BulkUpdateRequest, Entity, EntityType,
    Paginated, Registration, Subscription,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use url::Url;

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_TEXT: &str = "text/plain";

/// NGSIv2 client bound to one context broker.
///
/// Cheap to clone; clones share the underlying connection pool. Every
/// request carries `Accept` for the expected representation plus the
/// configured default headers (FIWARE tenant headers and the like).
///
/// # Example
///
/// ```ignore
/// let client = Ngsi2Client::from_config(&ClientConfig::load(None)?)?
///     .with_service("smartcity");
/// let room = client.get_entity("Bcn-Welt", Some("Room"), &[]).await?;
/// ```
#[derive(Clone, Debug)]
pub struct Ngsi2Client {
    http: HttpClient,
    base_url: Url,
    default_headers: Vec<(String, String)>,
}

impl Ngsi2Client {
    /// Wrap an existing transport.
    ///
    /// # Errors
    /// Returns [`Ngsi2Error::InvalidBaseUrl`] if `base_url` does not parse or
    /// cannot carry path segments.
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self, Ngsi2Error> {
        let parsed = Url::parse(base_url).map_err(|e| Ngsi2Error::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Ngsi2Error::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "not a hierarchical URL".to_owned(),
            });
        }

        Ok(Self {
            http,
            base_url: parsed,
            default_headers: Vec::new(),
        })
    }

    /// Validate `config`, build a transport from it and wrap it.
    ///
    /// # Errors
    /// Returns [`Ngsi2Error::Config`] for invalid configuration and
    /// [`Ngsi2Error::Http`] if the transport cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, Ngsi2Error> {
        let base_url = config.validate()?;
        let transport = if config.allow_insecure_http {
            TransportSecurity::AllowInsecureHttp
        } else {
            TransportSecurity::TlsOnly
        };

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .max_body_size(config.max_body_size)
            .transport(transport)
            .tls_roots(config.tls_roots.into())
            .build()?;

        let mut client = Self::new(http, base_url.as_str())?;
        if let Some(service) = config.service.as_deref().filter(|s| !s.is_empty()) {
            client = client.with_service(service);
        }
        if let Some(path) = config.service_path.as_deref().filter(|s| !s.is_empty()) {
            client = client.with_service_path(path);
        }

        debug!(base_url = %client.base_url, "NGSIv2 client configured");
        Ok(client)
    }

    /// Send `name: value` on every request, replacing an earlier value for
    /// the same name. `Accept` is chosen per operation and cannot be set here.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }

    /// Set the `Fiware-Service` tenant header.
    #[must_use]
    pub fn with_service(self, service: impl Into<String>) -> Self {
        self.with_default_header(FIWARE_SERVICE, service)
    }

    /// Set the `Fiware-ServicePath` header.
    #[must_use]
    pub fn with_service_path(self, service_path: impl Into<String>) -> Self {
        self.with_default_header(FIWARE_SERVICE_PATH, service_path)
    }

    pub fn default_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.default_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/v2/{segments...}?{params}`. Segments are percent-encoded,
    /// so ids containing `/` or spaces stay one segment.
    fn endpoint(&self, segments: &[&str], params: &QueryParams) -> Result<Url, Ngsi2Error> {
        let mut url = self.base_url.clone();
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| Ngsi2Error::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "not a hierarchical URL".to_owned(),
            })?
            .pop_if_empty()
            .push("v2")
            .extend(segments);
        params.apply_to(&mut url);
        Ok(url)
    }

    fn request(&self, method: Method, url: &Url, accept: &str) -> RequestBuilder {
        let defaults = self
            .default_headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case(ACCEPT.as_str()))
            .map(|(name, value)| (name.as_str(), value.as_str()));

        self.http
            .request(method, url.as_str())
            .header(ACCEPT.as_str(), accept)
            .headers(defaults)
    }

    /// Send and turn any non-2xx answer into an error.
    async fn execute(&self, request: RequestBuilder) -> Result<HttpResponse, Ngsi2Error> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await?;
        let err = Ngsi2Error::from_response(status, &body);
        debug!(
            status = status.as_u16(),
            error_code = err.error_body().map_or("", |b| b.error.as_str()),
            "context broker rejected request"
        );
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Ngsi2Error> {
        let response = self.execute(request).await?;
        decode(response).await
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        pagination: Pagination,
    ) -> Result<Paginated<T>, Ngsi2Error> {
        let response = self.execute(request).await?;
        let total = extract_total_count(response.headers());
        let items = decode(response).await?;
        Ok(Paginated::new(
            items,
            pagination.offset,
            pagination.limit,
            total,
        ))
    }

    async fn send(&self, request: RequestBuilder) -> Result<(), Ngsi2Error> {
        self.execute(request).await.map(drop)
    }

    /// Send a creation request and return the id from `Location`.
    async fn create(&self, request: RequestBuilder) -> Result<String, Ngsi2Error> {
        let response = self.execute(request).await?;
        let id = extract_id_from_location(response.headers()).ok_or(Ngsi2Error::MissingLocation)?;
        debug!(id = %id, "resource created");
        Ok(id)
    }
}

async fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, Ngsi2Error> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn type_param(entity_type: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    params.param("type", entity_type);
    params
}

#[async_trait]
impl Ngsi2Api for Ngsi2Client {
    #[instrument(skip_all)]
    async fn get_v2(&self) -> Result<BTreeMap<String, String>, Ngsi2Error> {
        let url = self.endpoint(&[], &QueryParams::new())?;
        let index: BTreeMap<String, Value> =
            self.fetch(self.request(Method::GET, &url, ACCEPT_JSON)).await?;

        Ok(index
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::String(link) => Some((name, link)),
                _ => None,
            })
            .collect())
    }

    #[instrument(skip_all, fields(offset = query.pagination.offset, limit = query.pagination.limit))]
    async fn get_entities(&self, query: &EntityQuery) -> Result<Paginated<Entity>, Ngsi2Error> {
        let url = self.endpoint(&["entities"], &query.to_params())?;
        self.fetch_page(self.request(Method::GET, &url, ACCEPT_JSON), query.pagination)
            .await
    }

    #[instrument(skip_all, fields(entity_id = %entity.id, entity_type = %entity.entity_type))]
    async fn add_entity(&self, entity: &Entity) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(&["entities"], &QueryParams::new())?;
        self.send(self.request(Method::POST, &url, ACCEPT_JSON).json(entity)?)
            .await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id))]
    async fn get_entity(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attrs: &[String],
    ) -> Result<Entity, Ngsi2Error> {
        let mut params = type_param(entity_type);
        params.list("attrs", attrs);
        let url = self.endpoint(&["entities", entity_id], &params)?;
        self.fetch(self.request(Method::GET, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id, append = append))]
    async fn update_entity(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attributes: &BTreeMap<String, Attribute>,
        append: bool,
    ) -> Result<(), Ngsi2Error> {
        let mut params = type_param(entity_type);
        if append {
            params.option("append");
        }
        let url = self.endpoint(&["entities", entity_id, "attrs"], &params)?;
        self.send(self.request(Method::POST, &url, ACCEPT_JSON).json(attributes)?)
            .await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id))]
    async fn replace_entity(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attributes: &BTreeMap<String, Attribute>,
    ) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(&["entities", entity_id, "attrs"], &type_param(entity_type))?;
        self.send(self.request(Method::PUT, &url, ACCEPT_JSON).json(attributes)?)
            .await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id))]
    async fn delete_entity(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
    ) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(&["entities", entity_id], &type_param(entity_type))?;
        self.send(self.request(Method::DELETE, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id, attribute = %attribute_name))]
    async fn get_attribute(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
    ) -> Result<Attribute, Ngsi2Error> {
        let url = self.endpoint(
            &["entities", entity_id, "attrs", attribute_name],
            &type_param(entity_type),
        )?;
        self.fetch(self.request(Method::GET, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id, attribute = %attribute_name))]
    async fn update_attribute(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
        attribute: &Attribute,
    ) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(
            &["entities", entity_id, "attrs", attribute_name],
            &type_param(entity_type),
        )?;
        self.send(self.request(Method::PUT, &url, ACCEPT_JSON).json(attribute)?)
            .await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id, attribute = %attribute_name))]
    async fn delete_attribute(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
    ) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(
            &["entities", entity_id, "attrs", attribute_name],
            &type_param(entity_type),
        )?;
        self.send(self.request(Method::DELETE, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id, attribute = %attribute_name))]
    async fn get_attribute_value(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
    ) -> Result<Value, Ngsi2Error> {
        let url = self.endpoint(
            &["entities", entity_id, "attrs", attribute_name, "value"],
            &type_param(entity_type),
        )?;
        self.fetch(self.request(Method::GET, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(entity_id = %entity_id, attribute = %attribute_name))]
    async fn get_attribute_value_as_string(
        &self,
        entity_id: &str,
        entity_type: Option<&str>,
        attribute_name: &str,
    ) -> Result<String, Ngsi2Error> {
        let url = self.endpoint(
            &["entities", entity_id, "attrs", attribute_name, "value"],
            &type_param(entity_type),
        )?;
        let response = self
            .execute(self.request(Method::GET, &url, ACCEPT_TEXT))
            .await?;
        let body = response.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    #[instrument(skip_all, fields(offset = pagination.offset, limit = pagination.limit))]
    async fn get_entity_types(
        &self,
        pagination: Pagination,
    ) -> Result<Paginated<EntityType>, Ngsi2Error> {
        let mut params = QueryParams::new();
        params.pagination(&pagination);
        let url = self.endpoint(&["types"], &params)?;
        self.fetch_page(self.request(Method::GET, &url, ACCEPT_JSON), pagination)
            .await
    }

    #[instrument(skip_all, fields(entity_type = %entity_type))]
    async fn get_entity_type(&self, entity_type: &str) -> Result<EntityType, Ngsi2Error> {
        let url = self.endpoint(&["types", entity_type], &QueryParams::new())?;
        self.fetch(self.request(Method::GET, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all)]
    async fn get_registrations(&self) -> Result<Vec<Registration>, Ngsi2Error> {
        let url = self.endpoint(&["registrations"], &QueryParams::new())?;
        self.fetch(self.request(Method::GET, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all)]
    async fn add_registration(&self, registration: &Registration) -> Result<String, Ngsi2Error> {
        let url = self.endpoint(&["registrations"], &QueryParams::new())?;
        self.create(self.request(Method::POST, &url, ACCEPT_JSON).json(registration)?)
            .await
    }

    #[instrument(skip_all, fields(registration_id = %registration_id))]
    async fn get_registration(&self, registration_id: &str) -> Result<Registration, Ngsi2Error> {
        let url = self.endpoint(&["registrations", registration_id], &QueryParams::new())?;
        self.fetch(self.request(Method::GET, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(registration_id = %registration_id))]
    async fn update_registration(
        &self,
        registration_id: &str,
        registration: &Registration,
    ) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(&["registrations", registration_id], &QueryParams::new())?;
        self.send(self.request(Method::PATCH, &url, ACCEPT_JSON).json(registration)?)
            .await
    }

    #[instrument(skip_all, fields(registration_id = %registration_id))]
    async fn delete_registration(&self, registration_id: &str) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(&["registrations", registration_id], &QueryParams::new())?;
        self.send(self.request(Method::DELETE, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(offset = pagination.offset, limit = pagination.limit))]
    async fn get_subscriptions(
        &self,
        pagination: Pagination,
    ) -> Result<Paginated<Subscription>, Ngsi2Error> {
        let mut params = QueryParams::new();
        params.pagination(&pagination);
        let url = self.endpoint(&["subscriptions"], &params)?;
        self.fetch_page(self.request(Method::GET, &url, ACCEPT_JSON), pagination)
            .await
    }

    #[instrument(skip_all)]
    async fn add_subscription(&self, subscription: &Subscription) -> Result<String, Ngsi2Error> {
        let url = self.endpoint(&["subscriptions"], &QueryParams::new())?;
        self.create(self.request(Method::POST, &url, ACCEPT_JSON).json(subscription)?)
            .await
    }

    #[instrument(skip_all, fields(subscription_id = %subscription_id))]
    async fn get_subscription(&self, subscription_id: &str) -> Result<Subscription, Ngsi2Error> {
        let url = self.endpoint(&["subscriptions", subscription_id], &QueryParams::new())?;
        self.fetch(self.request(Method::GET, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(subscription_id = %subscription_id))]
    async fn update_subscription(
        &self,
        subscription_id: &str,
        subscription: &Subscription,
    ) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(&["subscriptions", subscription_id], &QueryParams::new())?;
        self.send(self.request(Method::PATCH, &url, ACCEPT_JSON).json(subscription)?)
            .await
    }

    #[instrument(skip_all, fields(subscription_id = %subscription_id))]
    async fn delete_subscription(&self, subscription_id: &str) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(&["subscriptions", subscription_id], &QueryParams::new())?;
        self.send(self.request(Method::DELETE, &url, ACCEPT_JSON)).await
    }

    #[instrument(skip_all, fields(entities = request.entities.len()))]
    async fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<(), Ngsi2Error> {
        let url = self.endpoint(&["op", "update"], &QueryParams::new())?;
        self.send(self.request(Method::POST, &url, ACCEPT_JSON).json(request)?)
            .await
    }

    #[instrument(skip_all, fields(offset = pagination.offset, limit = pagination.limit))]
    async fn bulk_query(
        &self,
        request: &BulkQueryRequest,
        order_by: &[String],
        pagination: Pagination,
    ) -> Result<Paginated<Entity>, Ngsi2Error> {
        let mut params = QueryParams::new();
        params.list("orderBy", order_by).pagination(&pagination);
        let url = self.endpoint(&["op", "query"], &params)?;
        self.fetch_page(
            self.request(Method::POST, &url, ACCEPT_JSON).json(request)?,
            pagination,
        )
        .await
    }

    #[instrument(skip_all, fields(registrations = request.registrations.len()))]
    async fn bulk_register(&self, request: &BulkRegisterRequest) -> Result<Vec<String>, Ngsi2Error> {
        let url = self.endpoint(&["op", "register"], &QueryParams::new())?;
        self.fetch(self.request(Method::POST, &url, ACCEPT_JSON).json(request)?)
            .await
    }

    #[instrument(skip_all, fields(offset = pagination.offset, limit = pagination.limit))]
    async fn bulk_discover(
        &self,
        request: &BulkQueryRequest,
        pagination: Pagination,
    ) -> Result<Paginated<Registration>, Ngsi2Error> {
        let mut params = QueryParams::new();
        params.pagination(&pagination);
        let url = self.endpoint(&["op", "discover"], &params)?;
        self.fetch_page(
            self.request(Method::POST, &url, ACCEPT_JSON).json(request)?,
            pagination,
        )
        .await
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn client(base_url: &str) -> Ngsi2Client {
        let http = HttpClient::builder()
            .transport(TransportSecurity::AllowInsecureHttp)
            .build()
            .unwrap();
        Ngsi2Client::new(http, base_url).unwrap()
    }

    #[tokio::test]
    async fn endpoint_appends_v2() {
        let client = client("http://orion:1026");
        let url = client
            .endpoint(&["entities", "Bcn-Welt"], &QueryParams::new())
            .unwrap();
        assert_eq!(url.as_str(), "http://orion:1026/v2/entities/Bcn-Welt");
    }

    #[tokio::test]
    async fn endpoint_keeps_base_path() {
        let client = client("https://gateway.example.com/orion/");
        let url = client.endpoint(&["types"], &QueryParams::new()).unwrap();
        assert_eq!(url.as_str(), "https://gateway.example.com/orion/v2/types");

        let index = client.endpoint(&[], &QueryParams::new()).unwrap();
        assert_eq!(index.as_str(), "https://gateway.example.com/orion/v2");
    }

    #[tokio::test]
    async fn endpoint_encodes_segments() {
        let client = client("http://orion:1026");
        let url = client
            .endpoint(&["entities", "room 1/a"], &type_param(Some("Room")))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://orion:1026/v2/entities/room%201%2Fa?type=Room"
        );
    }

    #[tokio::test]
    async fn rejects_unusable_base_url() {
        let http = HttpClient::builder().build().unwrap();
        assert!(matches!(
            Ngsi2Client::new(http.clone(), "orion:1026"),
            Err(Ngsi2Error::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            Ngsi2Client::new(http, "not a url"),
            Err(Ngsi2Error::InvalidBaseUrl { .. })
        ));
    }

    #[tokio::test]
    async fn default_headers_replace_by_name() {
        let client = client("http://orion:1026")
            .with_service("smartcity")
            .with_service_path("/Madrid")
            .with_default_header("Fiware-Service", "other");

        let headers: Vec<_> = client.default_headers().collect();
        assert_eq!(
            headers,
            [("fiware-servicepath", "/Madrid"), ("Fiware-Service", "other")]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn from_config_sets_tenant_headers() {
        let config = ClientConfig {
            allow_insecure_http: true,
            service: Some("smartcity".to_owned()),
            service_path: Some(String::new()),
            ..ClientConfig::new("http://orion:1026")
        };
        let client = Ngsi2Client::from_config(&config).unwrap();
        let headers: Vec<_> = client.default_headers().collect();
        assert_eq!(headers, [("fiware-service", "smartcity")]);
        assert_eq!(client.base_url().as_str(), "http://orion:1026/");
        assert!(logs_contain("NGSIv2 client configured"));
    }

    #[tokio::test]
    async fn from_config_validates() {
        let err = Ngsi2Client::from_config(&ClientConfig::new("http://orion:1026")).unwrap_err();
        assert!(matches!(err, Ngsi2Error::Config(_)));
    }
}
