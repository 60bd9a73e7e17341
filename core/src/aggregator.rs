//! `UserDataAggregator`: the component the front end talks to.
//!
//! Owns the resource source and the selection slot. It hands out the
//! unconditional list feeds, one-shot composed queries for a fixed username,
//! and trigger-driven pipelines that follow `select_user`.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use crate::compose::{until_error, JoinMode, QueryComposer, UserDataStream};
use crate::config::Config;
use crate::error::ConfigError;
use crate::fetcher::{ResourceFetcher, ResourceSource, ResourceStream};
use crate::pipeline::QueryPipeline;
use crate::selection::UserSelection;
use crate::transport::ReqwestTransport;
use crate::types::{Post, ToDo, User};

pub struct UserDataAggregator<S = ResourceFetcher> {
    source: Arc<S>,
    selection: UserSelection,
}

impl UserDataAggregator<ResourceFetcher> {
    /// Aggregator talking HTTP to `config.base_url` through reqwest.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        let fetcher = ResourceFetcher::new(&config.base_url, Arc::new(transport));
        Ok(Self::new(fetcher))
    }
}

impl<S: ResourceSource> UserDataAggregator<S> {
    pub fn new(source: S) -> Self {
        Self::with_source(Arc::new(source))
    }

    pub fn with_source(source: Arc<S>) -> Self {
        Self {
            source,
            selection: UserSelection::new(),
        }
    }

    pub fn selection(&self) -> &UserSelection {
        &self.selection
    }

    /// Update the trigger value. Running pipelines restart on it.
    pub fn select_user(&self, username: &str) {
        self.selection.select_user(username);
    }

    pub fn composer(&self, mode: JoinMode) -> QueryComposer<S> {
        QueryComposer::new(Arc::clone(&self.source), mode)
    }

    /// Start a pipeline that follows this aggregator's selection.
    pub fn data_for_user(&self, mode: JoinMode) -> QueryPipeline {
        QueryPipeline::spawn(self.composer(mode), self.selection.subscribe())
    }

    pub fn user_data(&self, username: &str, mode: JoinMode) -> UserDataStream {
        self.composer(mode).user_data(username)
    }

    pub fn todos_for_user(&self, username: &str) -> ResourceStream<ToDo> {
        self.composer(JoinMode::AllOrNothing).todos_for_user(username)
    }

    pub fn todo_summary(&self, username: &str) -> UserDataStream {
        self.composer(JoinMode::AllOrNothing).todo_summary(username)
    }

    pub fn users(&self) -> ResourceStream<User> {
        let feed = self
            .source
            .users(None)
            .inspect_ok(|users| debug!(count = users.len(), ?users, "users"));
        until_error(feed.boxed())
    }

    pub fn todos(&self) -> ResourceStream<ToDo> {
        let feed = self
            .source
            .todos(None)
            .inspect_ok(|todos| debug!(count = todos.len(), ?todos, "todos"));
        until_error(feed.boxed())
    }

    pub fn posts(&self) -> ResourceStream<Post> {
        let feed = self
            .source
            .posts(None)
            .inspect_ok(|posts| debug!(count = posts.len(), "posts"));
        until_error(feed.boxed())
    }
}
