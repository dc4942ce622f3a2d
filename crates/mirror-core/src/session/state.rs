//! Session state types.

use crate::calibration::CalibrationResult;
use crate::catalog::Recommendation;
use crate::error::MirrorError;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// The single state a session is in.
///
/// Loading, result and error are variants of one value, so no combination
/// of them can be observed at the same time.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for input.
    #[default]
    Idle,
    /// A backend call is in flight for this text.
    Loading { input_text: String },
    /// A validated, resolved result is on display.
    Ready {
        result: Arc<CalibrationResult>,
        recommendation: Recommendation,
    },
    /// The last attempt failed.
    Failed { error: MirrorError },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// The error on display, if any.
    pub fn error(&self) -> Option<&MirrorError> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// The result on display, if any.
    pub fn result(&self) -> Option<&Arc<CalibrationResult>> {
        match self {
            Self::Ready { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Why `start_calibration` left the state untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejection {
    #[error("input is blank")]
    BlankInput,
    #[error("a calibration is already in flight")]
    InFlight,
    #[error("a result is on display; return before starting another calibration")]
    ResultShowing,
}
