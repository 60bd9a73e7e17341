//! Join and switch-latest properties checked with a scripted in-memory
//! source on a paused tokio clock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{sleep, timeout, Instant};
use userdata_core::{
    Filter, JoinMode, PipelineEvent, Post, QueryComposer, QueryPipeline, ResourceSource,
    ResourceStream, ToDo, User, UserDataAggregator, UserSelection,
};

/// Source with per-username lookup latency and configurable related
/// streams. Lookups that run to completion are recorded, so a cancelled
/// lookup never shows up in `completed_lookups`.
struct Scripted {
    users: Vec<User>,
    lookup_delay: HashMap<String, Duration>,
    todo_delay: Duration,
    post_delay: Duration,
    todo_rounds: u64,
    completed_lookups: Arc<Mutex<Vec<String>>>,
}

impl Scripted {
    fn new() -> Self {
        Self {
            users: vec![
                user(1, "Leanne Graham", "Bret"),
                user(2, "Ervin Howell", "Antonette"),
                user(7, "Kamren X", "Kamren"),
            ],
            lookup_delay: HashMap::new(),
            todo_delay: Duration::from_millis(10),
            post_delay: Duration::from_millis(5),
            todo_rounds: 1,
            completed_lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn slow_lookup(mut self, username: &str, delay: Duration) -> Self {
        self.lookup_delay.insert(username.to_string(), delay);
        self
    }

    fn completed(&self) -> Vec<String> {
        self.completed_lookups.lock().unwrap().clone()
    }
}

fn user(id: u64, name: &str, username: &str) -> User {
    User {
        id,
        name: name.to_string(),
        username: username.to_string(),
        email: String::new(),
        website: String::new(),
    }
}

fn user_id(filter: Option<Filter>) -> u64 {
    match filter {
        Some(Filter::UserId(id)) => id,
        other => panic!("expected userId filter, got {other:?}"),
    }
}

impl ResourceSource for Scripted {
    fn users(&self, filter: Option<Filter>) -> ResourceStream<User> {
        let Some(Filter::Username(name)) = filter else {
            return stream::iter([Ok(self.users.clone())]).boxed();
        };
        let matched: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.username == name)
            .cloned()
            .collect();
        let delay = self.lookup_delay.get(&name).copied().unwrap_or_default();
        let completed = Arc::clone(&self.completed_lookups);
        stream::once(async move {
            sleep(delay).await;
            completed.lock().unwrap().push(name);
            Ok(matched)
        })
        .boxed()
    }

    /// Emits `todo_rounds` snapshots, one per `todo_delay`; snapshot `n`
    /// holds a single todo with id `n`.
    fn todos(&self, filter: Option<Filter>) -> ResourceStream<ToDo> {
        let id = user_id(filter);
        let delay = self.todo_delay;
        stream::iter(1..=self.todo_rounds)
            .then(move |round| async move {
                sleep(delay).await;
                Ok(vec![ToDo {
                    user_id: id,
                    id: round,
                    title: format!("todo {round} of {id}"),
                    completed: false,
                }])
            })
            .boxed()
    }

    fn posts(&self, filter: Option<Filter>) -> ResourceStream<Post> {
        let id = user_id(filter);
        let delay = self.post_delay;
        stream::once(async move {
            sleep(delay).await;
            Ok(vec![Post {
                user_id: id,
                id: 100 + id,
                title: "p".to_string(),
                body: "b".to_string(),
            }])
        })
        .boxed()
    }
}

fn loading(username: &str) -> Option<PipelineEvent> {
    Some(PipelineEvent::Loading {
        username: username.to_string(),
    })
}

/// Collect every event that arrives before the pipeline goes quiet.
async fn drain(pipeline: &mut QueryPipeline) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = timeout(Duration::from_secs(10), pipeline.next_event()).await {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn superseded_chain_never_surfaces() {
    let source = Arc::new(Scripted::new().slow_lookup("Bret", Duration::from_secs(1)));
    let aggregator = UserDataAggregator::with_source(Arc::clone(&source));
    let mut pipeline = aggregator.data_for_user(JoinMode::AllOrNothing);
    assert_eq!(pipeline.next_event().await, Some(PipelineEvent::Idle));

    aggregator.select_user("Bret");
    assert_eq!(pipeline.next_event().await, loading("Bret"));
    aggregator.select_user("Antonette");

    let events = drain(&mut pipeline).await;
    assert_eq!(events.len(), 2, "{events:?}");
    assert_eq!(events[0], PipelineEvent::Loading { username: "Antonette".to_string() });
    match &events[1] {
        PipelineEvent::Loaded { username, data } => {
            assert_eq!(username, "Antonette");
            assert_eq!(data.name, "Ervin Howell");
            assert!(data.todos.iter().all(|t| t.user_id == 2));
        }
        other => panic!("expected Antonette's data, got {other:?}"),
    }
    assert_eq!(source.completed(), vec!["Antonette".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn current_selection_is_replayed_to_new_pipeline() {
    let aggregator = UserDataAggregator::new(Scripted::new());
    aggregator.select_user("Kamren");

    let mut pipeline = aggregator.data_for_user(JoinMode::LatestValues);
    assert_eq!(pipeline.next_event().await, loading("Kamren"));
    match pipeline.next_event().await {
        Some(PipelineEvent::Loaded { data, .. }) => assert_eq!(data.name, "Kamren X"),
        other => panic!("expected Kamren's data, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn clearing_selection_cancels_and_idles() {
    let source = Arc::new(Scripted::new().slow_lookup("Bret", Duration::from_secs(1)));
    let aggregator = UserDataAggregator::with_source(Arc::clone(&source));
    let mut pipeline = aggregator.data_for_user(JoinMode::AllOrNothing);
    assert_eq!(pipeline.next_event().await, Some(PipelineEvent::Idle));

    aggregator.select_user("Bret");
    assert_eq!(pipeline.next_event().await, loading("Bret"));
    aggregator.select_user("");

    assert_eq!(drain(&mut pipeline).await, vec![PipelineEvent::Idle]);
    assert!(source.completed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_chain_does_not_stop_the_pipeline() {
    let aggregator = UserDataAggregator::new(Scripted::new());
    let mut pipeline = aggregator.data_for_user(JoinMode::AllOrNothing);
    assert_eq!(pipeline.next_event().await, Some(PipelineEvent::Idle));

    aggregator.select_user("nobody");
    assert_eq!(pipeline.next_event().await, loading("nobody"));
    match pipeline.next_event().await {
        Some(PipelineEvent::Failed { error, .. }) => assert!(error.is_not_found()),
        other => panic!("expected NotFound, got {other:?}"),
    }

    aggregator.select_user("Kamren");
    assert_eq!(pipeline.next_event().await, loading("Kamren"));
    assert!(matches!(
        pipeline.next_event().await,
        Some(PipelineEvent::Loaded { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn pipeline_finishes_when_selection_is_dropped() {
    let selection = UserSelection::new();
    let composer = QueryComposer::new(Arc::new(Scripted::new()), JoinMode::AllOrNothing);
    let mut pipeline = QueryPipeline::spawn(composer, selection.subscribe());

    selection.select_user("Kamren");
    drop(selection);

    assert_eq!(pipeline.next_event().await, loading("Kamren"));
    assert!(matches!(
        pipeline.next_event().await,
        Some(PipelineEvent::Loaded { .. })
    ));
    assert_eq!(pipeline.next_event().await, None);
}

#[tokio::test(start_paused = true)]
async fn join_modes_match_for_single_shot_sources() {
    let source = Arc::new(Scripted::new());
    let all: Vec<_> = QueryComposer::new(Arc::clone(&source), JoinMode::AllOrNothing)
        .user_data("Kamren")
        .map(Result::unwrap)
        .collect()
        .await;
    let latest: Vec<_> = QueryComposer::new(source, JoinMode::LatestValues)
        .user_data("Kamren")
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(all.len(), 1);
    assert_eq!(
        serde_json::to_vec(&all).unwrap(),
        serde_json::to_vec(&latest).unwrap()
    );
}

#[tokio::test(start_paused = true)]
async fn latest_values_re_emits_and_all_or_nothing_keeps_last() {
    let source = Arc::new(Scripted {
        todo_rounds: 3,
        ..Scripted::new()
    });

    let latest: Vec<_> = QueryComposer::new(Arc::clone(&source), JoinMode::LatestValues)
        .user_data("Kamren")
        .map(Result::unwrap)
        .collect()
        .await;
    let todo_ids: Vec<u64> = latest.iter().map(|d| d.todos[0].id).collect();
    assert_eq!(todo_ids, vec![1, 2, 3]);

    let all: Vec<_> = QueryComposer::new(source, JoinMode::AllOrNothing)
        .user_data("Kamren")
        .map(Result::unwrap)
        .collect()
        .await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], latest[2]);
}

#[tokio::test(start_paused = true)]
async fn all_or_nothing_emits_nothing_for_an_empty_sub_fetch() {
    let source = Arc::new(Scripted {
        todo_rounds: 0,
        ..Scripted::new()
    });
    let results: Vec<_> = QueryComposer::new(source, JoinMode::AllOrNothing)
        .user_data("Kamren")
        .collect()
        .await;
    assert!(results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn related_fetches_run_concurrently() {
    let source = Arc::new(Scripted {
        todo_delay: Duration::from_millis(100),
        post_delay: Duration::from_millis(100),
        ..Scripted::new().slow_lookup("Kamren", Duration::from_millis(50))
    });
    let started = Instant::now();
    let results: Vec<_> = QueryComposer::new(source, JoinMode::AllOrNothing)
        .user_data("Kamren")
        .collect()
        .await;

    assert_eq!(results.len(), 1);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(150), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(250), "{elapsed:?}");
}
