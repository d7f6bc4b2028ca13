//! Self-refresh machinery
//!
//! Two independent timers that never touch playback state: the update
//! monitor (reload when the deployed version changes) and the heartbeat
//! reloader (unconditional periodic restart as a stability failsafe).
//! Both funnel into the single reload primitive.

pub mod heartbeat;
pub mod monitor;
pub mod reload;

pub use monitor::{FetchError, HttpVersionSource, UpdateMonitor, VersionSource};
pub use reload::{ProcessReload, ReloadHandle, ReloadReason};
