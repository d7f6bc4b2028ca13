//! Playback fault-recovery state machine
//!
//! Drives the player capability through the playlist loop: issue a
//! load/play attempt for the current item, absorb failures with a bounded
//! retry-then-skip policy, advance on natural end of media, and keep the
//! preloader pointed one item ahead.
//!
//! All state lives in one controller instance mutated from one task.
//! Timers are fire-and-forget and never cancelled; instead, every deferred
//! signal (retry timer, deferred start outcome, player event) carries the
//! [`AttemptId`] it was issued for and is dropped once the controller has
//! moved to a newer attempt. Playback failures are never fatal: they are
//! logged and recovered here, nothing propagates out.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::playback::player::{AttemptId, MediaPlayer, PlayOutcome, PlayerEvent, PlayerEventKind};
use crate::playback::playlist::Playlist;
use crate::playback::preload::{PreloadBackend, Preloader};
use crate::state::{PlaybackPhase, PlaybackStatus, SharedState};

/// Where the controller is in the load/play/retry cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// A load/play attempt is being issued for the item at this index
    Loading(usize),
    /// An attempt is underway; waiting for its outcome or the ended signal
    AwaitingOutcome(usize),
    /// A delayed retry is scheduled for this index
    Retrying { index: usize, attempt_no: u32 },
    /// Moving to the next playlist entry
    Advancing,
}

impl ControllerState {
    pub fn phase(&self) -> PlaybackPhase {
        match self {
            ControllerState::Loading(_) => PlaybackPhase::Loading,
            ControllerState::AwaitingOutcome(_) => PlaybackPhase::Playing,
            ControllerState::Retrying { .. } => PlaybackPhase::Retrying,
            ControllerState::Advancing => PlaybackPhase::Advancing,
        }
    }
}

/// Messages processed by the controller event loop
#[derive(Debug)]
pub enum ControllerMessage {
    /// Start outcome for an attempt, immediate or deferred
    Outcome {
        attempt: AttemptId,
        result: Result<(), String>,
    },
    /// A scheduled retry delay elapsed
    RetryDue { attempt: AttemptId },
}

/// The playback state machine
pub struct PlaybackController<P: MediaPlayer, B: PreloadBackend> {
    playlist: Playlist,
    player: P,
    preloader: Preloader<B>,
    max_retries: u32,
    retry_delay: Duration,
    state: ControllerState,
    current_index: usize,
    retry_count: u32,
    attempt: AttemptId,
    attempt_counter: u64,
    shared: SharedState,
    tx: mpsc::UnboundedSender<ControllerMessage>,
    rx: mpsc::UnboundedReceiver<ControllerMessage>,
}

impl<P: MediaPlayer, B: PreloadBackend> PlaybackController<P, B> {
    pub fn new(
        playlist: Playlist,
        player: P,
        preloader: Preloader<B>,
        max_retries: u32,
        retry_delay: Duration,
        shared: SharedState,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            playlist,
            player,
            preloader,
            max_retries,
            retry_delay,
            state: ControllerState::Loading(0),
            current_index: 0,
            retry_count: 0,
            attempt: AttemptId::new(0),
            attempt_counter: 0,
            shared,
            tx,
            rx,
        }
    }

    /// Event loop. Issues the initial attempt, warms the preload slot,
    /// then processes timer and player signals one at a time.
    pub async fn run(mut self, mut player_events: mpsc::UnboundedReceiver<PlayerEvent>) {
        self.start();
        self.preloader.refresh(&self.playlist, self.current_index);
        self.publish().await;

        loop {
            tokio::select! {
                Some(message) = self.rx.recv() => self.handle(message),
                Some(event) = player_events.recv() => self.on_player_event(event),
                else => break,
            }
            self.publish().await;
        }
    }

    fn handle(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::Outcome { attempt, result } => self.on_outcome(attempt, result),
            ControllerMessage::RetryDue { attempt } => self.on_retry_due(attempt),
        }
    }

    fn on_player_event(&mut self, event: PlayerEvent) {
        match event.kind {
            PlayerEventKind::Ended => self.on_ended(event.attempt),
            PlayerEventKind::Failed(reason) => self.on_outcome(event.attempt, Err(reason)),
        }
    }

    /// Issue a load/play attempt for the current index
    pub fn start(&mut self) {
        let index = self.current_index;
        self.attempt_counter += 1;
        self.attempt = AttemptId::new(self.attempt_counter);
        self.state = ControllerState::Loading(index);

        let item = self.playlist.item(index).clone();
        info!("playing [{}] {} ({})", index, item, self.attempt);

        match self.player.begin(&item, self.attempt) {
            PlayOutcome::Started => {
                self.state = ControllerState::AwaitingOutcome(index);
            }
            PlayOutcome::Failed(reason) => {
                // Routed through the message queue so a chain of
                // synchronous failures unwinds between attempts.
                self.state = ControllerState::AwaitingOutcome(index);
                let _ = self.tx.send(ControllerMessage::Outcome {
                    attempt: self.attempt,
                    result: Err(reason),
                });
            }
            PlayOutcome::Deferred(signal) => {
                self.state = ControllerState::AwaitingOutcome(index);
                let tx = self.tx.clone();
                let attempt = self.attempt;
                tokio::spawn(async move {
                    let result = match signal.await {
                        Ok(result) => result,
                        Err(_) => Err("player dropped the start signal".to_string()),
                    };
                    let _ = tx.send(ControllerMessage::Outcome { attempt, result });
                });
            }
        }
    }

    /// Start outcome for an attempt. Stale attempts are dropped.
    pub fn on_outcome(&mut self, attempt: AttemptId, result: Result<(), String>) {
        if attempt != self.attempt {
            debug!("ignoring stale outcome for {}", attempt);
            return;
        }
        match result {
            Ok(()) => {
                debug!(
                    "playback started for [{}] {}",
                    self.current_index,
                    self.playlist.item(self.current_index)
                );
                self.retry_count = 0;
                self.state = ControllerState::AwaitingOutcome(self.current_index);
            }
            Err(reason) => {
                warn!(
                    "playback failure for [{}] {} (retry #{}): {}",
                    self.current_index,
                    self.playlist.item(self.current_index),
                    self.retry_count + 1,
                    reason
                );
                self.retry_or_skip();
            }
        }
    }

    fn retry_or_skip(&mut self) {
        self.retry_count += 1;
        if self.retry_count >= self.max_retries {
            warn!(
                "giving up on [{}] {} after {} attempts, skipping",
                self.current_index,
                self.playlist.item(self.current_index),
                self.retry_count
            );
            self.retry_count = 0;
            self.advance();
        } else {
            self.state = ControllerState::Retrying {
                index: self.current_index,
                attempt_no: self.retry_count,
            };
            debug!("retrying [{}] in {:?}", self.current_index, self.retry_delay);
            let tx = self.tx.clone();
            let attempt = self.attempt;
            let delay = self.retry_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(ControllerMessage::RetryDue { attempt });
            });
        }
    }

    /// A retry delay elapsed. Re-attempts the same index unless a later
    /// event (e.g. a natural ended signal) already moved past the attempt
    /// the timer was scheduled against.
    pub fn on_retry_due(&mut self, attempt: AttemptId) {
        if attempt != self.attempt {
            debug!("ignoring stale retry timer for {}", attempt);
            return;
        }
        self.start();
    }

    /// Playback finished naturally. Stale attempts are dropped.
    pub fn on_ended(&mut self, attempt: AttemptId) {
        if attempt != self.attempt {
            debug!("ignoring stale ended signal for {}", attempt);
            return;
        }
        info!(
            "finished [{}] {}",
            self.current_index,
            self.playlist.item(self.current_index)
        );
        self.retry_count = 0;
        self.advance();
    }

    /// Move to the next playlist entry, start it, refresh the preload
    fn advance(&mut self) {
        self.state = ControllerState::Advancing;
        self.current_index = self.playlist.next_index(self.current_index);
        self.start();
        self.preloader.refresh(&self.playlist, self.current_index);
    }

    async fn publish(&self) {
        self.shared
            .set_playback(PlaybackStatus {
                phase: self.state.phase(),
                current_index: self.current_index,
                current_item: self.playlist.item(self.current_index).to_string(),
                retry_count: self.retry_count,
            })
            .await;
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn current_attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn preload_target(&self) -> Option<usize> {
        self.preloader.target_index()
    }
}
