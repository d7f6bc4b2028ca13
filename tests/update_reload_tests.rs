//! Update monitor / heartbeat / reload integration
//!
//! Runs the two reload-triggering timers against the real first-wins
//! reload latch with the tokio clock paused.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use signloop::update::{
    heartbeat, FetchError, ProcessReload, ReloadReason, UpdateMonitor, VersionSource,
};
use signloop::SharedState;

struct ScriptedSource {
    responses: Mutex<VecDeque<Result<String, FetchError>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<String, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl VersionSource for ScriptedSource {
    async fn fetch_version(&self) -> Result<String, FetchError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".to_string())))
    }
}

/// A version change reported while the heartbeat is still far away wins
/// the latch; the later heartbeat tick is a no-op.
#[tokio::test(start_paused = true)]
async fn test_update_beats_heartbeat_to_the_latch() {
    let (reload, mut reload_rx) = ProcessReload::new();
    let shared = SharedState::new(1);

    let monitor = UpdateMonitor::new(
        ScriptedSource::new(vec![Ok("a1".to_string()), Ok("b2".to_string())]),
        reload.clone(),
        Duration::from_secs(60),
        shared,
    );
    tokio::spawn(monitor.run());
    tokio::spawn(heartbeat::run(Duration::from_secs(43_200), reload.clone()));

    assert_eq!(reload_rx.recv().await, Some(ReloadReason::UpdateDetected));

    // Run past several heartbeat periods: the latch already fired, so
    // nothing further arrives.
    tokio::time::sleep(Duration::from_secs(100_000)).await;
    assert!(reload_rx.try_recv().is_err());
}

/// With the version endpoint permanently failing, only the heartbeat ever
/// fires.
#[tokio::test(start_paused = true)]
async fn test_heartbeat_fires_despite_failing_version_checks() {
    let (reload, mut reload_rx) = ProcessReload::new();
    let shared = SharedState::new(1);

    let monitor = UpdateMonitor::new(
        ScriptedSource::new(Vec::new()), // every poll is a transport error
        reload.clone(),
        Duration::from_secs(60),
        shared,
    );
    tokio::spawn(monitor.run());
    tokio::spawn(heartbeat::run(Duration::from_secs(3_600), reload.clone()));

    assert_eq!(reload_rx.recv().await, Some(ReloadReason::Heartbeat));
}
