//! Stateless HTTP request builder and response parser for the resource API.
//!
//! # Design
//! `ResourceClient` holds only a `base_url` and carries no mutable state
//! between calls. Each resource is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The transport executes the actual round-trip, keeping this
//! layer deterministic and free of I/O.

use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Filter, Post, ToDo, User};

pub const USERS_PATH: &str = "users";
pub const TODOS_PATH: &str = "todos";
pub const POSTS_PATH: &str = "posts";

/// Synchronous, stateless client for the users / todos / posts endpoints.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    base_url: String,
}

impl ResourceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_fetch_users(&self, filter: Option<&Filter>) -> HttpRequest {
        self.build_list(USERS_PATH, filter)
    }

    pub fn build_fetch_todos(&self, filter: Option<&Filter>) -> HttpRequest {
        self.build_list(TODOS_PATH, filter)
    }

    pub fn build_fetch_posts(&self, filter: Option<&Filter>) -> HttpRequest {
        self.build_list(POSTS_PATH, filter)
    }

    pub fn parse_users(&self, response: HttpResponse) -> Result<Vec<User>, FetchError> {
        parse_list(response)
    }

    pub fn parse_todos(&self, response: HttpResponse) -> Result<Vec<ToDo>, FetchError> {
        parse_list(response)
    }

    pub fn parse_posts(&self, response: HttpResponse) -> Result<Vec<Post>, FetchError> {
        parse_list(response)
    }

    fn build_list(&self, resource: &str, filter: Option<&Filter>) -> HttpRequest {
        HttpRequest {
            path: format!("{}/{resource}", self.base_url),
            query: filter.map(Filter::query_pair).into_iter().collect(),
        }
    }
}

fn parse_list<T: DeserializeOwned>(response: HttpResponse) -> Result<Vec<T>, FetchError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Map non-success status codes to `FetchError::Status`.
fn check_status(response: &HttpResponse) -> Result<(), FetchError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(FetchError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}
