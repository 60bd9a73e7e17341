//! The selected-username trigger slot.
//!
//! Backed by a `tokio::sync::watch` channel: a single writer, any number of
//! subscribers, and each subscriber sees the value current at subscribe time
//! followed by every later update. Dropping a receiver unsubscribes it.

use tokio::sync::watch;
use tracing::debug;

#[derive(Debug)]
pub struct UserSelection {
    tx: watch::Sender<String>,
}

impl Default for UserSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl UserSelection {
    /// A slot holding the empty string, which means "nothing selected".
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self { tx }
    }

    /// Replace the selected username. Every update counts, including one
    /// that repeats the current value.
    pub fn select_user(&self, username: &str) {
        debug!(username, subscribers = self.tx.receiver_count(), "user selected");
        self.tx.send_replace(username.to_string());
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
