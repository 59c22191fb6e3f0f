//! User-facing notifications
//!
//! A fire-and-forget channel for the handful of events a listener should
//! actually see. The player never surfaces anything else directly; whoever
//! owns the receiving end decides how to display it.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// What went wrong, from the listener's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A freshly loaded station failed to start
    PlaybackFailed,
    /// Resuming the current station failed
    ResumeFailed,
}

/// A single user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Sending half, held by the orchestrator
#[derive(Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
}

impl Notifier {
    /// Send a notification; if nobody is listening it is dropped.
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        let _ = self.tx.send(Notification {
            kind,
            message: message.into(),
        });
    }
}

/// Create a notification channel
pub fn channel() -> (Notifier, Receiver<Notification>) {
    let (tx, rx) = unbounded();
    (Notifier { tx }, rx)
}
