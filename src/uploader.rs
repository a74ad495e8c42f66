use std::fmt;
use std::time::Duration;

use anyhow::{Context as _, Result};
use log::{debug, warn};
use reqwest::StatusCode;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::reading::Reading;
use crate::room::RoomUpdate;

pub const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Sent,
    /// No API key is configured, nothing was sent.
    Skipped,
}

#[derive(Debug)]
pub enum UploadError {
    Transport(reqwest::Error),
    Status(StatusCode),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport error: {err}"),
            Self::Status(status) => write!(f, "server responded with {status}"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// Pushes readings to the server's ingestion endpoint.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    runtime: Handle,
}

impl Uploader {
    /// Must be called inside a tokio runtime; uploads are spawned on it.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let runtime = Handle::try_current().context("uploader needs a tokio runtime")?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            runtime,
        })
    }

    pub fn endpoint(&self, room_id: &str) -> String {
        format!("{}/api/room/{room_id}", self.base_url.trim_end_matches('/'))
    }

    pub async fn upload(
        &self,
        room_id: &str,
        reading: &Reading,
    ) -> Result<UploadOutcome, UploadError> {
        if self.api_key.is_empty() {
            return Ok(UploadOutcome::Skipped);
        }

        let response = self
            .client
            .post(self.endpoint(room_id))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&RoomUpdate::from(reading))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status));
        }

        Ok(UploadOutcome::Sent)
    }

    /// Uploads in a detached task. The outcome is only logged; callers get no
    /// completion signal and uploads may finish out of order.
    ///
    /// Safe to call from threads outside the runtime.
    pub fn dispatch(&self, room_id: String, reading: Reading) -> JoinHandle<()> {
        let uploader = self.clone();

        self.runtime.spawn(async move {
            match uploader.upload(&room_id, &reading).await {
                Ok(UploadOutcome::Sent) => debug!("uploaded reading for {room_id}"),
                Ok(UploadOutcome::Skipped) => {
                    warn!("API key is not configured, skipped upload for {room_id}")
                }
                Err(err) => warn!("upload for {room_id} failed: {err}"),
            }
        })
    }
}
