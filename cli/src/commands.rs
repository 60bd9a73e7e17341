//! Command execution. Results go to `out` as JSON; logs go to stderr.

use std::io::Write;

use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;
use userdata_core::error::GENERIC_MESSAGE;
use userdata_core::{FetchError, JoinMode, PipelineEvent, ResourceSource, UserDataAggregator};

use crate::cli::Command;

pub async fn run<S: ResourceSource, W: Write>(
    command: Command,
    aggregator: UserDataAggregator<S>,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Users => print_all(aggregator.users(), out).await,
        Command::Todos => print_all(aggregator.todos(), out).await,
        Command::Posts => print_all(aggregator.posts(), out).await,
        Command::User { username, join } => {
            print_all(aggregator.user_data(&username, join.into()), out).await
        }
        Command::TodosFor { username } => print_all(aggregator.todos_for_user(&username), out).await,
        Command::Summary { username } => print_all(aggregator.todo_summary(&username), out).await,
        Command::Watch { join } => {
            let stdin = BufReader::new(tokio::io::stdin());
            watch(aggregator, join.into(), stdin, out).await
        }
    }
}

async fn print_all<T: Serialize, W: Write>(
    mut results: BoxStream<'static, Result<T, FetchError>>,
    out: &mut W,
) -> anyhow::Result<()> {
    while let Some(result) = results.next().await {
        let value = result.map_err(|e| anyhow::Error::new(e).context(GENERIC_MESSAGE))?;
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    }
    Ok(())
}

/// Feed each input line to `select_user` and print every pipeline event.
/// At end of input the selection is released, so the pipeline finishes its
/// current chain and the loop ends.
async fn watch<S, R, W>(
    aggregator: UserDataAggregator<S>,
    mode: JoinMode,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: ResourceSource,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut pipeline = aggregator.data_for_user(mode);
    let mut lines = input.lines();
    let mut aggregator = Some(aggregator);

    loop {
        tokio::select! {
            line = lines.next_line(), if aggregator.is_some() => {
                match line? {
                    Some(line) => {
                        if let Some(aggregator) = &aggregator {
                            aggregator.select_user(line.trim());
                        }
                    }
                    None => {
                        debug!("input closed");
                        aggregator = None;
                    }
                }
            }
            event = pipeline.next_event() => {
                let Some(event) = event else { break };
                writeln!(out, "{}", event_json(&event))?;
                out.flush()?;
            }
        }
    }
    Ok(())
}

fn event_json(event: &PipelineEvent) -> serde_json::Value {
    match event {
        PipelineEvent::Idle => json!({ "state": "idle" }),
        PipelineEvent::Loading { username } => json!({ "state": "loading", "username": username }),
        PipelineEvent::Loaded { username, data } => {
            json!({ "state": "loaded", "username": username, "data": data })
        }
        PipelineEvent::Failed { username, error } => json!({
            "state": "failed",
            "username": username,
            "message": error.user_message(),
            "detail": error.to_string(),
        }),
    }
}
