//! Looping playback core
//!
//! Playlist data, the player capability abstraction, the preload pipeline,
//! and the fault-recovery controller that ties them together.

pub mod controller;
pub mod player;
pub mod playlist;
pub mod preload;

pub use controller::{ControllerMessage, ControllerState, PlaybackController};
pub use player::{AttemptId, MediaPlayer, PlayOutcome, PlayerEvent, PlayerEventKind, ProcessPlayer};
pub use playlist::{MediaItem, Playlist};
pub use preload::{FilePrefetcher, PreloadBackend, Preloader};
