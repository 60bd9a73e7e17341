//! Async client core that aggregates users, todos and posts.
//!
//! # Overview
//! Fetches related resources from a JSON REST API and composes them into
//! `UserData` view models. A user lookup runs first; that user's todos and
//! posts are then fetched concurrently and merged.
//!
//! # Design
//! - `ResourceClient` is stateless and split into `build_*` / `parse_*`, so
//!   the I/O boundary stays explicit and testable without a network.
//! - `Transport` performs the round-trip; `ReqwestTransport` is the default.
//! - `QueryComposer` turns a `ResourceSource` into dependent query streams,
//!   joined either all-or-nothing or latest-values (`JoinMode`).
//! - `QueryPipeline` follows a `UserSelection` with switch-latest semantics:
//!   a new selection cancels the previous chain.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod aggregator;
pub mod client;
pub mod compose;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod pipeline;
pub mod selection;
pub mod transport;
pub mod types;

pub use aggregator::UserDataAggregator;
pub use client::ResourceClient;
pub use compose::{JoinMode, QueryComposer, UserDataStream};
pub use config::Config;
pub use error::{ConfigError, FetchError};
pub use fetcher::{ResourceFetcher, ResourceSource, ResourceStream};
pub use http::{HttpRequest, HttpResponse};
pub use pipeline::{PipelineEvent, QueryPipeline};
pub use selection::UserSelection;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Filter, Post, ToDo, User, UserData};
