//! Heartbeat reloader
//!
//! Unconditionally requests a reload every fixed long interval. Stateless;
//! a stability failsafe against slow resource leaks and drift on devices
//! that run for months.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::update::reload::{ReloadHandle, ReloadReason};

/// Request a reload every `period`, forever
pub async fn run<R: ReloadHandle>(period: Duration, reload: R) {
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately; the heartbeat should fire a
    // full period after startup.
    tick.tick().await;

    loop {
        tick.tick().await;
        info!("heartbeat interval elapsed, requesting reload");
        reload.request_reload(ReloadReason::Heartbeat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingReload {
        count: Arc<Mutex<usize>>,
    }

    impl ReloadHandle for RecordingReload {
        fn request_reload(&self, reason: ReloadReason) {
            assert_eq!(reason, ReloadReason::Heartbeat);
            *self.count.lock().unwrap() += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_per_period() {
        let reload = RecordingReload::default();
        tokio::spawn(run(Duration::from_secs(3600), reload.clone()));

        tokio::time::sleep(Duration::from_secs(1800)).await;
        assert_eq!(*reload.count.lock().unwrap(), 0, "no early firing");

        tokio::time::sleep(Duration::from_secs(10800)).await;
        // Ticks at 1h, 2h and 3h within the 3.5h window.
        assert_eq!(*reload.count.lock().unwrap(), 3);
    }
}
