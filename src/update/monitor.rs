//! Remote version polling
//!
//! Fetches an opaque version identifier on a fixed interval and requests a
//! reload when it changes. The first successful poll only establishes the
//! baseline. A failed poll changes nothing and is retried by the next
//! scheduled tick, never by an inner retry loop, so a flaky network cannot
//! cause spurious restarts.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::state::SharedState;
use crate::update::reload::{ReloadHandle, ReloadReason};

/// Version fetch errors, all absorbed by the monitor
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Remote source of the deployed version identifier
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn fetch_version(&self) -> std::result::Result<String, FetchError>;
}

/// Wire shape of the version endpoint; only `versionId` is read
#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(rename = "versionId")]
    version_id: String,
}

/// Version source backed by an HTTP GET with caching disabled
pub struct HttpVersionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpVersionSource {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl VersionSource for HttpVersionSource {
    async fn fetch_version(&self) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body: VersionResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(body.version_id)
    }
}

/// Polls a [`VersionSource`] and triggers a reload on change
pub struct UpdateMonitor<S: VersionSource, R: ReloadHandle> {
    source: S,
    reload: R,
    poll_interval: Duration,
    last_version: Option<String>,
    shared: SharedState,
}

impl<S: VersionSource, R: ReloadHandle> UpdateMonitor<S, R> {
    pub fn new(source: S, reload: R, poll_interval: Duration, shared: SharedState) -> Self {
        Self {
            source,
            reload,
            poll_interval,
            last_version: None,
            shared,
        }
    }

    /// One poll of the version source.
    ///
    /// Reloads only when a baseline exists and the identifier differs from
    /// it. The identifier is recorded either way; after a reload request
    /// that is moot, since the process restarts.
    pub async fn poll_once(&mut self) {
        match self.source.fetch_version().await {
            Ok(version) => {
                match &self.last_version {
                    Some(previous) if *previous != version => {
                        info!("version changed ({} -> {})", previous, version);
                        self.reload.request_reload(ReloadReason::UpdateDetected);
                    }
                    Some(_) => debug!("version unchanged ({})", version),
                    None => info!("version baseline established ({})", version),
                }
                self.last_version = Some(version.clone());
                self.shared.set_last_version(Some(version)).await;
            }
            Err(e) => {
                warn!("version check failed: {}", e);
            }
        }
    }

    /// Poll on the configured fixed interval for the process lifetime
    pub async fn run(mut self) {
        let mut tick = interval(self.poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tick.tick().await;
            self.poll_once().await;
        }
    }

    pub fn last_version(&self) -> Option<&str> {
        self.last_version.as_deref()
    }
}
