//! Dependent query composition: user lookup, then related fan-out.
//!
//! # Design
//! Every composed query is a `BoxStream` of `Result<UserData, FetchError>`.
//! The user lookup always completes before any related request is issued;
//! todos and posts are then requested concurrently. How the two related
//! streams are merged is selected with [`JoinMode`]. A composed stream
//! yields at most one error and ends right after it.

use std::future::ready;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::error::FetchError;
use crate::fetcher::{ResourceSource, ResourceStream};
use crate::types::{Filter, Post, ToDo, User, UserData};

/// A stream of merged results for one username.
pub type UserDataStream = BoxStream<'static, Result<UserData, FetchError>>;

/// Fan-in discipline for the related sub-fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    /// Wait until every sub-fetch has completed, then emit once using each
    /// sub-fetch's last value. Emits nothing if a sub-fetch ends empty.
    #[default]
    AllOrNothing,
    /// Emit as soon as every sub-fetch has produced a value, then again on
    /// every later value from any of them.
    LatestValues,
}

/// Builds dependent query chains on top of a [`ResourceSource`].
pub struct QueryComposer<S> {
    source: Arc<S>,
    mode: JoinMode,
}

impl<S> Clone for QueryComposer<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            mode: self.mode,
        }
    }
}

impl<S: ResourceSource> QueryComposer<S> {
    pub fn new(source: Arc<S>, mode: JoinMode) -> Self {
        Self { source, mode }
    }

    pub fn mode(&self) -> JoinMode {
        self.mode
    }

    /// Resolve `username`, then join that user's todos and posts.
    pub fn user_data(&self, username: &str) -> UserDataStream {
        let source = Arc::clone(&self.source);
        let mode = self.mode;
        let composed = lookup(&self.source, username)
            .map_ok(move |user| join_related(source.as_ref(), user, mode))
            .try_flatten();
        until_error(composed.boxed())
    }

    /// Resolve `username`, then fetch only that user's todos.
    pub fn todos_for_user(&self, username: &str) -> ResourceStream<ToDo> {
        let source = Arc::clone(&self.source);
        let composed = lookup(&self.source, username)
            .map_ok(move |user| source.todos(Some(Filter::UserId(user.id))))
            .try_flatten();
        until_error(composed.boxed())
    }

    /// Resolve `username`, then wait for that user's todos and emit a
    /// `UserData` with no posts.
    pub fn todo_summary(&self, username: &str) -> UserDataStream {
        let source = Arc::clone(&self.source);
        let composed = lookup(&self.source, username)
            .map_ok(move |user| {
                let todos = source.todos(Some(Filter::UserId(user.id)));
                stream::once(async move {
                    let todos = last_value(todos).await?;
                    let data = todos.map(|todos| UserData::new(&user, todos, Vec::new()));
                    Ok::<_, FetchError>(data)
                })
                .try_filter_map(|data| ready(Ok(data)))
                .boxed()
            })
            .try_flatten();
        until_error(composed.boxed())
    }
}

/// First user matching `username`, taken from the first emission of the
/// lookup stream. An empty match is `NotFound`.
fn lookup<S: ResourceSource>(
    source: &Arc<S>,
    username: &str,
) -> BoxStream<'static, Result<User, FetchError>> {
    let mut users = source.users(Some(Filter::username(username)));
    let username = username.to_string();
    stream::once(async move {
        let found = match users.next().await {
            Some(result) => result?,
            None => Vec::new(),
        };
        found
            .into_iter()
            .next()
            .ok_or(FetchError::NotFound { username })
    })
    .boxed()
}

fn join_related<S: ResourceSource + ?Sized>(
    source: &S,
    user: User,
    mode: JoinMode,
) -> UserDataStream {
    let todos = source.todos(Some(Filter::UserId(user.id)));
    let posts = source.posts(Some(Filter::UserId(user.id)));
    match mode {
        JoinMode::AllOrNothing => join_all(user, todos, posts),
        JoinMode::LatestValues => join_latest(user, todos, posts),
    }
}

fn join_all(user: User, todos: ResourceStream<ToDo>, posts: ResourceStream<Post>) -> UserDataStream {
    stream::once(async move {
        let (todos, posts) = futures::try_join!(last_value(todos), last_value(posts))?;
        let data = todos
            .zip(posts)
            .map(|(todos, posts)| UserData::new(&user, todos, posts));
        Ok::<_, FetchError>(data)
    })
    .try_filter_map(|data| ready(Ok(data)))
    .boxed()
}

enum Related {
    Todos(Vec<ToDo>),
    Posts(Vec<Post>),
}

fn join_latest(
    user: User,
    todos: ResourceStream<ToDo>,
    posts: ResourceStream<Post>,
) -> UserDataStream {
    let mut latest_todos: Option<Vec<ToDo>> = None;
    let mut latest_posts: Option<Vec<Post>> = None;
    stream::select(todos.map_ok(Related::Todos), posts.map_ok(Related::Posts))
        .try_filter_map(move |related| {
            match related {
                Related::Todos(todos) => latest_todos = Some(todos),
                Related::Posts(posts) => latest_posts = Some(posts),
            }
            let merged = match (&latest_todos, &latest_posts) {
                (Some(todos), Some(posts)) => {
                    Some(UserData::new(&user, todos.clone(), posts.clone()))
                }
                _ => None,
            };
            ready(Ok(merged))
        })
        .boxed()
}

/// Drain `stream`, keeping only its last value. Fails on the first error.
async fn last_value<T>(stream: ResourceStream<T>) -> Result<Option<Vec<T>>, FetchError> {
    stream
        .try_fold(None, |_, value| ready(Ok(Some(value))))
        .await
}

/// End `stream` right after its first error.
pub(crate) fn until_error<T: Send + 'static>(
    stream: BoxStream<'static, Result<T, FetchError>>,
) -> BoxStream<'static, Result<T, FetchError>> {
    stream
        .scan(false, |failed, item| {
            if *failed {
                return ready(None);
            }
            *failed = item.is_err();
            ready(Some(item))
        })
        .boxed()
}
