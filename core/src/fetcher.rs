//! Async resource fetcher and the `ResourceSource` seam the composer reads
//! from.
//!
//! # Design
//! `ResourceSource` hands out streams rather than futures so the composer can
//! also join sources that emit more than once. `ResourceFetcher` is the HTTP
//! implementation: each stream performs exactly one GET and then ends.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use crate::client::ResourceClient;
use crate::error::FetchError;
use crate::transport::Transport;
use crate::types::{Filter, Post, ToDo, User};

/// A stream of list snapshots for one resource. Ends after an error.
pub type ResourceStream<T> = BoxStream<'static, Result<Vec<T>, FetchError>>;

/// Anything that can produce users, todos and posts on demand.
pub trait ResourceSource: Send + Sync + 'static {
    fn users(&self, filter: Option<Filter>) -> ResourceStream<User>;
    fn todos(&self, filter: Option<Filter>) -> ResourceStream<ToDo>;
    fn posts(&self, filter: Option<Filter>) -> ResourceStream<Post>;
}

/// Fetches resources over HTTP through an injected `Transport`.
#[derive(Clone)]
pub struct ResourceFetcher {
    client: ResourceClient,
    transport: Arc<dyn Transport>,
}

impl ResourceFetcher {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: ResourceClient::new(base_url),
            transport,
        }
    }

    pub async fn fetch_users(&self, filter: Option<&Filter>) -> Result<Vec<User>, FetchError> {
        let request = self.client.build_fetch_users(filter);
        debug!(url = %request.url(), "fetching users");
        let response = self.transport.execute(request).await?;
        let users = self.client.parse_users(response)?;
        debug!(count = users.len(), "users received");
        Ok(users)
    }

    pub async fn fetch_todos(&self, filter: Option<&Filter>) -> Result<Vec<ToDo>, FetchError> {
        let request = self.client.build_fetch_todos(filter);
        debug!(url = %request.url(), "fetching todos");
        let response = self.transport.execute(request).await?;
        let todos = self.client.parse_todos(response)?;
        debug!(count = todos.len(), "todos received");
        Ok(todos)
    }

    pub async fn fetch_posts(&self, filter: Option<&Filter>) -> Result<Vec<Post>, FetchError> {
        let request = self.client.build_fetch_posts(filter);
        debug!(url = %request.url(), "fetching posts");
        let response = self.transport.execute(request).await?;
        let posts = self.client.parse_posts(response)?;
        debug!(count = posts.len(), "posts received");
        Ok(posts)
    }
}

impl ResourceSource for ResourceFetcher {
    fn users(&self, filter: Option<Filter>) -> ResourceStream<User> {
        let fetcher = self.clone();
        stream::once(async move { fetcher.fetch_users(filter.as_ref()).await }).boxed()
    }

    fn todos(&self, filter: Option<Filter>) -> ResourceStream<ToDo> {
        let fetcher = self.clone();
        stream::once(async move { fetcher.fetch_todos(filter.as_ref()).await }).boxed()
    }

    fn posts(&self, filter: Option<Filter>) -> ResourceStream<Post> {
        let fetcher = self.clone();
        stream::once(async move { fetcher.fetch_posts(filter.as_ref()).await }).boxed()
    }
}
