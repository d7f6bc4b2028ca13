//! Reload primitive
//!
//! A full reload means: exit the process and let the supervisor restart it
//! cold. That discards every in-flight timer and all local state, which is
//! exactly the cancellation semantics the rest of the system relies on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

/// Why a reload was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The remote version identifier changed
    UpdateDetected,
    /// The unconditional heartbeat interval elapsed
    Heartbeat,
}

impl std::fmt::Display for ReloadReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReloadReason::UpdateDetected => write!(f, "new version detected"),
            ReloadReason::Heartbeat => write!(f, "heartbeat interval elapsed"),
        }
    }
}

/// Idempotent "restart the process" action
pub trait ReloadHandle: Clone + Send + Sync + 'static {
    fn request_reload(&self, reason: ReloadReason);
}

/// Reload handle wired to the main task
///
/// The first request wins; later requests are no-ops. Main receives the
/// reason and exits with the restart exit code.
#[derive(Clone)]
pub struct ProcessReload {
    tx: mpsc::UnboundedSender<ReloadReason>,
    fired: Arc<AtomicBool>,
}

impl ProcessReload {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReloadReason>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                fired: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }
}

impl ReloadHandle for ProcessReload {
    fn request_reload(&self, reason: ReloadReason) {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("reload already requested, ignoring ({})", reason);
            return;
        }
        info!("reload requested: {}", reason);
        let _ = self.tx.send(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_wins() {
        let (reload, mut rx) = ProcessReload::new();

        reload.request_reload(ReloadReason::UpdateDetected);
        reload.request_reload(ReloadReason::Heartbeat);
        reload.request_reload(ReloadReason::Heartbeat);

        assert_eq!(rx.recv().await, Some(ReloadReason::UpdateDetected));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_clones_share_the_latch() {
        let (reload, mut rx) = ProcessReload::new();
        let other = reload.clone();

        reload.request_reload(ReloadReason::Heartbeat);
        other.request_reload(ReloadReason::UpdateDetected);

        assert_eq!(rx.recv().await, Some(ReloadReason::Heartbeat));
        assert!(rx.try_recv().is_err());
    }
}
