//! Core domain of the Mirror reflection tool.
//!
//! Everything here is synchronous and free of I/O: the session state
//! machine, result validation, catalog resolution, history and the
//! playback state. Network, files and audio devices sit behind the
//! [`calibration::CalibrationClient`], [`secret::SecretService`] and
//! [`playback::AudioOutput`] traits.

pub mod calibration;
pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod placeholder;
pub mod playback;
pub mod secret;
pub mod session;
pub mod validator;

// Re-export common error type
pub use error::{MirrorError, Result};
