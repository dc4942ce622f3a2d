//! Credential lookup trait.
//!
//! Defines the interface for loading the backend API key.

use crate::error::Result;

/// Service for loading the backend credential.
///
/// # Security Note
///
/// Implementations should ensure that the key is never logged or exposed
/// in error messages.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the API key.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: a non-blank key
    /// - `Err(MirrorError::Config)`: no key is configured (the message names
    ///   where it was looked for, never the value)
    async fn api_key(&self) -> Result<String>;
}
