//! Shared status state
//!
//! Read-heavy snapshot of what the player is doing, published by the
//! playback controller and update monitor and served by the status API.
//! The controller owns the real state machine; this is an observation
//! surface only.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Coarse playback phase derived from the controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    Loading,
    Playing,
    Retrying,
    Advancing,
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackPhase::Loading => write!(f, "loading"),
            PlaybackPhase::Playing => write!(f, "playing"),
            PlaybackPhase::Retrying => write!(f, "retrying"),
            PlaybackPhase::Advancing => write!(f, "advancing"),
        }
    }
}

/// Playback portion of the status snapshot
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackStatus {
    pub phase: PlaybackPhase,
    pub current_index: usize,
    pub current_item: String,
    pub retry_count: u32,
}

/// Full status snapshot served by the API
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub playback: PlaybackStatus,
    pub playlist_len: usize,
    pub last_version_id: Option<String>,
    pub started_at: DateTime<Utc>,
}

/// Shared status state
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<RwLock<StateInner>>,
}

#[derive(Debug)]
struct StateInner {
    playback: PlaybackStatus,
    playlist_len: usize,
    last_version_id: Option<String>,
    started_at: DateTime<Utc>,
}

impl SharedState {
    pub fn new(playlist_len: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateInner {
                playback: PlaybackStatus {
                    phase: PlaybackPhase::Loading,
                    current_index: 0,
                    current_item: String::new(),
                    retry_count: 0,
                },
                playlist_len,
                last_version_id: None,
                started_at: Utc::now(),
            })),
        }
    }

    pub async fn set_playback(&self, playback: PlaybackStatus) {
        self.inner.write().await.playback = playback;
    }

    pub async fn set_last_version(&self, version_id: Option<String>) {
        self.inner.write().await.last_version_id = version_id;
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        let inner = self.inner.read().await;
        StatusSnapshot {
            playback: inner.playback.clone(),
            playlist_len: inner.playlist_len,
            last_version_id: inner.last_version_id.clone(),
            started_at: inner.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_reflects_updates() {
        let state = SharedState::new(3);

        state
            .set_playback(PlaybackStatus {
                phase: PlaybackPhase::Playing,
                current_index: 2,
                current_item: "b.mp4".to_string(),
                retry_count: 1,
            })
            .await;
        state.set_last_version(Some("a1".to_string())).await;

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.playback.phase, PlaybackPhase::Playing);
        assert_eq!(snapshot.playback.current_index, 2);
        assert_eq!(snapshot.playback.retry_count, 1);
        assert_eq!(snapshot.playlist_len, 3);
        assert_eq!(snapshot.last_version_id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(PlaybackPhase::Playing.to_string(), "playing");
        assert_eq!(PlaybackPhase::Retrying.to_string(), "retrying");
    }
}
