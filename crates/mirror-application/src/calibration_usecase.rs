//! Calibration use case.
//!
//! Couples the pure `SessionOrchestrator` state machine with the backend
//! client and the playback coordinator. The orchestrator lock is released
//! before the backend call and taken again to record the outcome, so a
//! second submission during the call observes `Loading` and is rejected.

use mirror_core::calibration::CalibrationClient;
use mirror_core::catalog::{CatalogIndex, Track};
use mirror_core::history::HistoryItem;
use mirror_core::playback::{PlaybackCoordinator, PlaybackState};
use mirror_core::session::{SessionOrchestrator, SessionState, StartRejection};
use mirror_core::{MirrorError, Result};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Everything a frontend needs to draw the current screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub input: String,
    /// Most recent first.
    pub history: Vec<Arc<HistoryItem>>,
    pub playback: PlaybackState,
}

/// Use case for running calibrations and controlling playback.
///
/// # Lock order
///
/// Operations that need both locks take `session` before `playback`.
/// Neither lock is held while the backend call is pending.
pub struct CalibrationUseCase {
    client: Arc<dyn CalibrationClient>,
    catalog: Arc<CatalogIndex>,
    session: Mutex<SessionOrchestrator>,
    playback: Mutex<PlaybackCoordinator>,
    request_timeout: Option<Duration>,
}

impl CalibrationUseCase {
    pub fn new(
        client: Arc<dyn CalibrationClient>,
        catalog: Arc<CatalogIndex>,
        history_capacity: NonZeroUsize,
        playback: PlaybackCoordinator,
    ) -> Self {
        Self {
            client,
            session: Mutex::new(SessionOrchestrator::new(catalog.clone(), history_capacity)),
            catalog,
            playback: Mutex::new(playback),
            request_timeout: None,
        }
    }

    /// Fails backend calls that take longer than `timeout`.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &Arc<CatalogIndex> {
        &self.catalog
    }

    /// Submits `text` and waits for the session to settle.
    ///
    /// Returns the state after the backend answered: `Ready` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns the rejection when the session would not accept a new
    /// calibration. No backend call is made in that case.
    pub async fn calibrate(&self, text: &str) -> std::result::Result<SessionState, StartRejection> {
        let input_text = self.begin(text).await?;
        Ok(self.finish(&input_text).await)
    }

    /// Moves the session to `Loading` and returns the text to submit.
    ///
    /// On success the input buffer holds `text`. A rejected call leaves the
    /// session and its input buffer untouched. Follow with
    /// [`finish`](Self::finish).
    pub async fn begin(&self, text: &str) -> std::result::Result<String, StartRejection> {
        self.session.lock().await.start_calibration(text)
    }

    /// Calls the backend for a calibration accepted by
    /// [`begin`](Self::begin) and records the outcome.
    ///
    /// Returns the state after the backend answered: `Ready` or `Failed`.
    pub async fn finish(&self, input_text: &str) -> SessionState {
        let outcome = self.submit(input_text).await;

        let mut session = self.session.lock().await;
        match outcome {
            Ok(raw_text) => {
                let mut playback = self.playback.lock().await;
                session.on_success(&raw_text, &mut playback).clone()
            }
            Err(error) => {
                tracing::error!(kind = ?error.backend_kind(), "Calibration failed: {}", error);
                session.on_failure(error).clone()
            }
        }
    }

    async fn submit(&self, input_text: &str) -> Result<String> {
        let call = self.client.submit(input_text);
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(MirrorError::network(format!(
                    "Request timed out after {}ms",
                    limit.as_millis()
                )))
            }),
            None => call.await,
        }
    }

    /// Leaves the result or error screen.
    pub async fn reset(&self) -> SessionState {
        self.session.lock().await.reset().clone()
    }

    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state().clone()
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.session.lock().await.set_input(text);
    }

    /// Most recent first.
    pub async fn history(&self) -> Vec<Arc<HistoryItem>> {
        self.session.lock().await.history().list()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        let playback = self.playback.lock().await;
        SessionSnapshot {
            state: session.state().clone(),
            input: session.input().to_string(),
            history: session.history().list(),
            playback: playback.state().clone(),
        }
    }

    pub async fn playback_state(&self) -> PlaybackState {
        self.playback.lock().await.state().clone()
    }

    /// Plays `track`, or pauses it when it is already playing.
    pub async fn play_track(&self, track: Arc<Track>) -> PlaybackState {
        let mut playback = self.playback.lock().await;
        playback.play_catalog_track(track);
        playback.state().clone()
    }

    /// Plays the track at `index` (zero based) in catalog order.
    pub async fn play_track_at(&self, index: usize) -> Option<PlaybackState> {
        let track = self.catalog.tracks().get(index)?.clone();
        Some(self.play_track(track).await)
    }

    /// Plays the track recommended by the result on display.
    pub async fn play_recommended(&self) -> Option<PlaybackState> {
        let track = match self.session.lock().await.state() {
            SessionState::Ready { recommendation, .. } => recommendation.track.clone(),
            _ => return None,
        };
        Some(self.play_track(track).await)
    }

    pub async fn toggle_ambient(&self) -> PlaybackState {
        let mut playback = self.playback.lock().await;
        playback.toggle_ambient();
        playback.state().clone()
    }

    pub async fn stop_all(&self) -> PlaybackState {
        let mut playback = self.playback.lock().await;
        playback.stop_all();
        playback.state().clone()
    }

    /// Picks up sources that ended on their own. Returns the new state
    /// when it changed.
    pub async fn poll_playback(&self) -> Option<PlaybackState> {
        let mut playback = self.playback.lock().await;
        playback.poll().then(|| playback.state().clone())
    }
}
