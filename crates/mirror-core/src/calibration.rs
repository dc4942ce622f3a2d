//! Calibration domain model and the backend boundary.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Number of remedy steps every result carries.
pub const FIVE_STEPS: usize = 5;

/// A validated answer from the language-model backend.
///
/// Instances only come out of [`crate::validator::ResultValidator::parse`],
/// so every string is non-empty and there are always exactly five steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationResult {
    /// Diagnostic reading of the concern.
    pub frequency_scan: String,
    /// The illusion the concern rests on.
    pub illusion_stripping: String,
    /// Ordered remedy steps.
    pub five_steps: [String; FIVE_STEPS],
    /// A single concrete action cue.
    pub action_anchor: String,
    /// Free-text book title as returned by the backend.
    pub recommended_book_title: String,
    /// Free-text track title as returned by the backend.
    pub recommended_music_title: String,
}

/// Boundary to the external language-model backend.
///
/// One call to [`submit`](CalibrationClient::submit) issues at most one
/// network request. Implementations do no de-duplication or queuing; the
/// session state machine is what keeps a second request from starting.
#[async_trait::async_trait]
pub trait CalibrationClient: Send + Sync {
    /// Sends the user's text and returns the backend's raw answer.
    ///
    /// # Errors
    ///
    /// - `MirrorError::Config` when no credential is configured; no request is made.
    /// - `MirrorError::Backend` on transport failure or a non-success answer.
    async fn submit(&self, input_text: &str) -> Result<String>;
}
