//! Cooperative cancellation for in-flight sessions and queries.
//!
//! A watch channel carries the cancel flag from the surrounding request
//! context (deadline, client disconnect) into the core. The core checks the
//! flag between operations -- before pulling the next record, before a batch
//! execution, between scan rows -- and aborts cooperatively: no forced
//! preemption, no partial-commit guarantee for an abandoned batch.

use tokio::sync::watch;

/// Sender half: owned by the transport layer, fired on deadline expiry or
/// client disconnect.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation to every clone of the paired [`Cancellation`].
    pub fn cancel(&self) {
        // Ignore send errors -- all receivers may have been dropped.
        let _ = self.tx.send(true);
    }
}

/// Receiver half: passed into every blocking call of a session or query.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// Creates a connected handle/receiver pair.
    #[must_use]
    pub fn pair() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, Self { rx })
    }

    /// A receiver that never fires, for callers without a deadline.
    #[must_use]
    pub fn none() -> Self {
        let (tx, rx) = watch::channel(false);
        // Dropping the sender freezes the flag at false.
        drop(tx);
        Self { rx }
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}
