//! # signloop
//!
//! Unattended looping media player for kiosk displays.
//!
//! **Purpose:** Cycle through a fixed playlist forever, absorb playback
//! failures with a bounded retry-then-skip policy, keep the next item
//! preloaded for gapless transitions, and restart the process when a new
//! deployment is detected or the long heartbeat interval elapses.
//!
//! **Architecture:** One single-task playback state machine driving an
//! opaque player capability, plus two independent timers (update poll,
//! heartbeat) that only ever request a process reload.

pub mod api;
pub mod config;
pub mod error;
pub mod playback;
pub mod state;
pub mod update;

pub use error::{Error, Result};
pub use state::SharedState;
