//! Client library for the Ticketmatic 3 (TM3) REST API.
//!
//! Builds authenticated requests against the platform's endpoint
//! catalogue, transparently paginates multi-page listings and bulk queries
//! into a single in-memory collection, tracks per-operation call
//! statistics, and caches rarely-changing lookup lists for the lifetime of
//! the process.
//!
//! ```rust,no_run
//! use tm3_api::{Credentials, TmClient};
//!
//! # async fn demo() -> Result<(), tm3_api::ApiError> {
//! let client = TmClient::new(Credentials::new("demo", "key", "secret"))?;
//!
//! // One record, one page, or the whole collection.
//! let contact = client.get_one("contacts", 10002, None).await?;
//! let recent = client
//!     .list_all("contacts", Some(serde_json::json!({ "lastupdatesince": "2024-01-01" })))
//!     .await?;
//!
//! // Reference data is fetched once per process.
//! let address_types = client.lookup_list("addresstypes", None).await?;
//! # let _ = (contact, recent, address_types);
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod cache;
pub mod client;
pub mod config;
pub mod error;
mod export;
mod pagination;
mod params;
mod request;
pub mod stats;
pub mod url;

pub use auth::Credentials;
pub use cache::LOOKUP_TYPES;
pub use client::TmClient;
pub use config::{ApiConfig, Host, Schema};
pub use error::ApiError;
pub use pagination::{LIST_LIMIT, QUERY_LIMIT};
pub use stats::StatsSnapshot;
pub use url::{OperationKind, RecordId};
