//! # Stockask Core
//!
//! Answers natural-language questions about historical stock prices.
//!
//! ## Overview
//!
//! A question travels through a short pipeline:
//!
//! ```text
//!  text ──▶ NluClient ──▶ NluResponse ──▶ Query
//!                                          │
//!                                          ▼
//!                     ValueStore ──▶ lookup_value ──▶ LookupResult
//!                                                       │
//!                                                       ▼
//!                                              ChartLayout ──▶ SVG
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`chart`] | Axis scaling, plot coordinates and SVG output |
//! | [`domain`] | Entities, aggregates, daily values, symbols, dates |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`favourites`] | Saved questions |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`lookup`] | Value store contract and aggregation |
//! | [`nlu`] | NLU service contract and the Watson Assistant adapter |
//! | [`query`] | Entity validation into a [`Query`] |
//! | [`service`] | End-to-end [`QueryService`] |
//!
//! ## Error Handling
//!
//! The two domain failures a user can trigger are reported, never panicked on:
//!
//! ```rust
//! use stockask_core::{Entity, NluResponse, Query, QueryError};
//!
//! let response = NluResponse::new("max of AAPL")
//!     .with_entity(Entity::Date, "2015-01-01")
//!     .with_entity(Entity::Company, "AAPL");
//!
//! match Query::from_response(&response) {
//!     Err(QueryError::UnknownQuery { reason }) => assert!(reason.contains("found 1")),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

pub mod chart;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod favourites;
pub mod http_client;
pub mod lookup;
pub mod nlu;
pub mod query;
pub mod service;
mod store;

pub use chart::{ChartError, ChartLayout, ChartSize};

pub use domain::{
    sort_by_date, Aggregate, AggregateValue, DailyValue, Entity, Symbol, TradingDate, UtcDateTime,
};

pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

pub use error::{CoreError, QueryError, ValidationError};

pub use favourites::{Favourite, FavouriteStore, FavouritesError};

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StaticHttpClient,
};

pub use lookup::{lookup_value, InMemoryValueStore, LookupResult, StoreError, ValueStore};

pub use nlu::{NluClient, NluError, NluErrorKind, NluResponse, WatsonAssistant, WatsonConfig};

pub use query::{Query, ValueQuery};

pub use service::{Answer, QueryService};

pub use store::daily_value;

// Warehouse (re-exported from stockask-warehouse)
pub use stockask_warehouse::{
    CompanyRecord, PriceRecord, Warehouse, WarehouseConfig, WarehouseError,
};
