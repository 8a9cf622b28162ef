//! Notification sinks for user-facing announcements.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::mpsc::{self, Receiver, Sender};

/// Receives short announcements such as "Sync paused.".
///
/// Called from copy worker threads, so implementations must not block.
pub trait Notifier: Send + Sync {
    /// Deliver one announcement.
    fn notify(&self, message: &str);
}

/// Writes announcements to the log at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        log::info!("{message}");
    }
}

/// Discards announcements.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str) {}
}

/// Forwards announcements into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: Sender<String>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str) {
        if self.tx.send(message.to_string()).is_err() {
            log::debug!("Notification dropped, receiver closed: {message}");
        }
    }
}
