//! Backend interaction for Mirror.
//!
//! Provides the Gemini implementation of
//! [`CalibrationClient`](mirror_core::calibration::CalibrationClient) and the
//! instruction text it sends.

pub mod gemini_client;
pub mod prompt;

pub use gemini_client::GeminiCalibrationClient;
pub use prompt::{build_system_instruction, user_prompt};
