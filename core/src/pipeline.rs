//! Trigger-driven query pipeline with switch-latest semantics.
//!
//! # Design
//! One background task watches the selection receiver and owns at most one
//! running query chain. A new trigger value drops the previous chain's
//! stream before the next one starts, which cancels its in-flight requests;
//! the trigger branch is polled first, so a result that races with a newer
//! selection is never forwarded. An empty value returns the pipeline to
//! idle without issuing a request.

use std::future::pending;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::compose::{QueryComposer, UserDataStream};
use crate::error::FetchError;
use crate::fetcher::ResourceSource;
use crate::types::UserData;

/// What the pipeline reports to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Nothing is selected; no request is running.
    Idle,
    /// A chain for `username` has started.
    Loading { username: String },
    /// The chain for `username` produced a merged result. May repeat for
    /// sources that emit more than once.
    Loaded { username: String, data: UserData },
    /// The chain for `username` failed and has stopped.
    Failed { username: String, error: FetchError },
}

/// Handle to a running pipeline. Dropping it stops the background task and
/// cancels any running chain.
pub struct QueryPipeline {
    events: mpsc::UnboundedReceiver<PipelineEvent>,
    task: JoinHandle<()>,
}

impl QueryPipeline {
    /// Start driving `composer` from `trigger`. The value current in
    /// `trigger` is acted on immediately.
    pub fn spawn<S: ResourceSource>(
        composer: QueryComposer<S>,
        trigger: watch::Receiver<String>,
    ) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(drive(composer, trigger, tx));
        Self { events, task }
    }

    /// Next event, or `None` once the trigger is gone and the last chain has
    /// finished.
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        self.events.recv().await
    }
}

impl Drop for QueryPipeline {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Chain {
    username: String,
    results: UserDataStream,
}

async fn drive<S: ResourceSource>(
    composer: QueryComposer<S>,
    mut trigger: watch::Receiver<String>,
    events: mpsc::UnboundedSender<PipelineEvent>,
) {
    let initial = trigger.borrow_and_update().clone();
    let mut chain = start(&composer, initial, &events);
    let mut trigger_open = true;

    loop {
        if events.is_closed() {
            break;
        }
        tokio::select! {
            biased;
            changed = trigger.changed(), if trigger_open => {
                if changed.is_err() {
                    debug!("selection closed, finishing current chain");
                    trigger_open = false;
                    continue;
                }
                let username = trigger.borrow_and_update().clone();
                if let Some(previous) = chain.take() {
                    debug!(username = %previous.username, "cancelling superseded chain");
                }
                chain = start(&composer, username, &events);
            }
            item = next_item(&mut chain), if chain.is_some() => {
                let Some(current) = chain.as_ref() else { continue };
                let username = current.username.clone();
                match item {
                    Some(Ok(data)) => {
                        info!(%username, todos = data.todos.len(), posts = data.posts.len(), "user data loaded");
                        let _ = events.send(PipelineEvent::Loaded { username, data });
                    }
                    Some(Err(error)) => {
                        warn!(%username, %error, "query chain failed");
                        let _ = events.send(PipelineEvent::Failed { username, error });
                        chain = None;
                    }
                    None => {
                        debug!(%username, "query chain completed");
                        chain = None;
                    }
                }
            }
            else => break,
        }
    }
}

fn start<S: ResourceSource>(
    composer: &QueryComposer<S>,
    username: String,
    events: &mpsc::UnboundedSender<PipelineEvent>,
) -> Option<Chain> {
    if username.is_empty() {
        info!("selection cleared, pipeline idle");
        let _ = events.send(PipelineEvent::Idle);
        return None;
    }
    info!(%username, mode = ?composer.mode(), "starting query chain");
    let _ = events.send(PipelineEvent::Loading {
        username: username.clone(),
    });
    Some(Chain {
        results: composer.user_data(&username),
        username,
    })
}

async fn next_item(chain: &mut Option<Chain>) -> Option<Result<UserData, FetchError>> {
    match chain {
        Some(chain) => chain.results.next().await,
        None => pending().await,
    }
}
