#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Typed async client for FIWARE NGSIv2 context brokers (Orion and compatibles).
//!
//! [`Ngsi2Client`] implements [`Ngsi2Api`] over [`ngsi2_http::HttpClient`]:
//! entities, attributes, entity types, subscriptions, registrations and the
//! `/v2/op/*` batch operations. Broker rejections surface as
//! [`Ngsi2Error::Broker`] carrying the NGSIv2 [`ErrorBody`](ngsi2_model::ErrorBody).
//!
//! ```ignore
//! use ngsi2_client::{EntityQuery, Ngsi2Api, Ngsi2Client, ClientConfig, Pagination};
//!
//! let client = Ngsi2Client::from_config(&ClientConfig::load(None)?)?;
//! let rooms = client
//!     .get_entities(&EntityQuery::new().types(["Room"]).pagination(Pagination::new(0, 20, true)))
//!     .await?;
//! println!("{} of {} rooms", rooms.len(), rooms.total);
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod query;

pub use api::Ngsi2Api;
pub use client::Ngsi2Client;
pub use config::{ClientConfig, ConfigError, TlsRoots};
pub use error::Ngsi2Error;
pub use query::{EntityQuery, Pagination, QueryParams};

pub use ngsi2_model as model;
