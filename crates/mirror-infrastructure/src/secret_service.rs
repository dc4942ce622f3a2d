//! Secret service implementation.
//!
//! Reads the backend API key from a process environment variable.

use mirror_core::config::DEFAULT_API_KEY_ENV;
use mirror_core::secret::SecretService;
use mirror_core::{MirrorError, Result};

/// Loads the API key from an environment variable on every call.
///
/// # Example
///
/// ```ignore
/// use mirror_infrastructure::EnvSecretService;
/// use mirror_core::secret::SecretService;
///
/// let service = EnvSecretService::new("VITE_GEMINI_API_KEY");
/// let key = service.api_key().await?;
/// ```
#[derive(Debug, Clone)]
pub struct EnvSecretService {
    var_name: String,
}

impl EnvSecretService {
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    fn read_key(&self) -> Result<String> {
        match std::env::var(&self.var_name) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(MirrorError::config(format!(
                "API key is missing. Set the {} environment variable.",
                self.var_name
            ))),
        }
    }
}

impl Default for EnvSecretService {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_ENV)
    }
}

#[async_trait::async_trait]
impl SecretService for EnvSecretService {
    async fn api_key(&self) -> Result<String> {
        self.read_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_variable_is_config_error() {
        let service = EnvSecretService::new("MIRROR_TEST_KEY_THAT_IS_NEVER_SET");
        let err = service.api_key().await.unwrap_err();
        assert!(err.is_config());
        assert!(err.user_message().contains("MIRROR_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[tokio::test]
    async fn test_present_variable_is_returned_trimmed() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("MIRROR_TEST_KEY_PRESENT", "  secret-key \n") };
        let service = EnvSecretService::new("MIRROR_TEST_KEY_PRESENT");
        assert_eq!(service.api_key().await.unwrap(), "secret-key");
    }

    #[tokio::test]
    async fn test_blank_variable_is_config_error() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("MIRROR_TEST_KEY_BLANK", "   ") };
        let service = EnvSecretService::new("MIRROR_TEST_KEY_BLANK");
        assert!(service.api_key().await.unwrap_err().is_config());
    }

    #[test]
    fn test_default_variable_name() {
        assert_eq!(EnvSecretService::default().var_name(), "VITE_GEMINI_API_KEY");
    }
}
