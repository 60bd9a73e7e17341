//! Command-line surface.

use clap::{Parser, Subcommand, ValueEnum};
use userdata_core::config::DEFAULT_BASE_URL;
use userdata_core::JoinMode;

#[derive(Debug, Parser)]
#[command(
    name = "userdata",
    version,
    about = "Fetch users, todos and posts and merge them per user"
)]
pub struct Cli {
    /// Base URL of the REST API.
    #[arg(long, env = "USERDATA_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "USERDATA_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every user.
    Users,
    /// List every todo.
    Todos,
    /// List every post.
    Posts,
    /// Look up a user and print their merged todos and posts.
    User {
        username: String,
        #[arg(long, value_enum, default_value_t)]
        join: Join,
    },
    /// Look up a user and print only their todos.
    TodosFor { username: String },
    /// Look up a user and print their name with todos, without posts.
    Summary { username: String },
    /// Read usernames from stdin, one per line, and print pipeline events
    /// as JSON lines. An empty line clears the selection.
    Watch {
        #[arg(long, value_enum, default_value_t)]
        join: Join,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Join {
    /// Wait for every related fetch, emit once.
    #[default]
    All,
    /// Emit whenever any related fetch produces a value.
    Latest,
}

impl From<Join> for JoinMode {
    fn from(join: Join) -> Self {
        match join {
            Join::All => JoinMode::AllOrNothing,
            Join::Latest => JoinMode::LatestValues,
        }
    }
}
