//! Player capability abstraction
//!
//! The controller never talks to a concrete renderer. It hands a media
//! reference and an attempt token to a [`MediaPlayer`] and interprets the
//! returned [`PlayOutcome`]; completion and runtime failures arrive later
//! as [`PlayerEvent`]s tagged with the same token.

use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::playback::playlist::MediaItem;

/// Token identifying one logical play attempt
///
/// Every deferred signal carries the token of the attempt it belongs to so
/// the controller can drop signals that a later attempt has superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attempt#{}", self.0)
    }
}

/// Result of issuing a play attempt
///
/// One uniform sum type: either the attempt is underway, it failed right
/// away, or the player will report the start outcome later.
#[derive(Debug)]
pub enum PlayOutcome {
    /// Playback is underway; an `Ended` or `Failed` event follows
    Started,
    /// The attempt failed synchronously
    Failed(String),
    /// The start outcome resolves later on this signal
    Deferred(oneshot::Receiver<Result<(), String>>),
}

/// Deferred signal from the player, tagged with its attempt
#[derive(Debug)]
pub struct PlayerEvent {
    pub attempt: AttemptId,
    pub kind: PlayerEventKind,
}

/// What the player is reporting
#[derive(Debug)]
pub enum PlayerEventKind {
    /// Playback finished naturally
    Ended,
    /// Playback failed after it had started
    Failed(String),
}

/// Opaque playback capability consumed by the controller
pub trait MediaPlayer: Send {
    /// Begin a play attempt for `item`. The immediate outcome is returned;
    /// later signals for this attempt must carry `attempt`.
    fn begin(&mut self, item: &MediaItem, attempt: AttemptId) -> PlayOutcome;
}

/// Player backed by an external media player process
///
/// Spawns one player process per item (e.g. `mpv --fs <file>`). A clean
/// exit is a natural end of media; a spawn error is a synchronous failure;
/// a non-zero exit is a runtime failure. The child is always reaped by the
/// waiter task, so no zombies accumulate.
pub struct ProcessPlayer {
    command: String,
    args: Vec<String>,
    events: mpsc::UnboundedSender<PlayerEvent>,
}

impl ProcessPlayer {
    pub fn new(
        command: String,
        args: Vec<String>,
        events: mpsc::UnboundedSender<PlayerEvent>,
    ) -> Self {
        Self {
            command,
            args,
            events,
        }
    }
}

impl MediaPlayer for ProcessPlayer {
    fn begin(&mut self, item: &MediaItem, attempt: AttemptId) -> PlayOutcome {
        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .arg(item.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return PlayOutcome::Failed(format!("failed to spawn {}: {}", self.command, e));
            }
        };

        debug!("spawned {} for {} ({})", self.command, item, attempt);

        let events = self.events.clone();
        tokio::spawn(async move {
            let kind = match child.wait().await {
                Ok(status) if status.success() => PlayerEventKind::Ended,
                Ok(status) => PlayerEventKind::Failed(format!("player exited with {}", status)),
                Err(e) => PlayerEventKind::Failed(format!("failed to wait on player: {}", e)),
            };
            let _ = events.send(PlayerEvent { attempt, kind });
        });

        PlayOutcome::Started
    }
}
