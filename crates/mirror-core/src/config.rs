//! Application configuration model.
//!
//! Every field has a default, so a missing file or a partial file both load.

use crate::error::{MirrorError, Result};
use crate::placeholder::PlaceholderTiming;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_API_KEY_ENV: &str = "VITE_GEMINI_API_KEY";
pub const DEFAULT_AMBIENT_URL: &str = "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-15.mp3";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MirrorConfig {
    /// Backend model name.
    pub model: String,
    /// Backend endpoint prefix; `/{model}:generateContent` is appended.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Number of past calibrations kept.
    pub history_capacity: usize,
    /// Abandon a backend call after this many seconds. No limit when unset.
    pub request_timeout_secs: Option<u64>,
    /// Looping background track.
    pub ambient_url: String,
    /// Catalog file replacing the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    pub player: PlayerConfig,
    pub placeholder: PlaceholderConfig,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            history_capacity: 10,
            request_timeout_secs: None,
            ambient_url: DEFAULT_AMBIENT_URL.to_string(),
            catalog_path: None,
            player: PlayerConfig::default(),
            placeholder: PlaceholderConfig::default(),
        }
    }
}

impl MirrorConfig {
    /// History capacity as a non-zero count.
    ///
    /// # Errors
    ///
    /// Returns a config error for a capacity of zero.
    pub fn history_capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.history_capacity)
            .ok_or_else(|| MirrorError::config("history_capacity must be at least 1"))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<()> {
        self.history_capacity()?;
        if self.model.trim().is_empty() {
            return Err(MirrorError::config("model must not be empty"));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(MirrorError::config("api_key_env must not be empty"));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(MirrorError::config("request_timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

/// External player used for audio.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub command: String,
    /// Arguments placed before the URL.
    pub args: Vec<String>,
    /// Extra arguments for the looping ambient track.
    pub loop_args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            args: vec!["--no-video".to_string(), "--really-quiet".to_string()],
            loop_args: vec!["--loop-file=inf".to_string()],
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub typing_ms: u64,
    pub deleting_ms: u64,
    pub hold_ms: u64,
    pub phrases: Vec<String>,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        let timing = PlaceholderTiming::default();
        Self {
            typing_ms: timing.typing.as_millis() as u64,
            deleting_ms: timing.deleting.as_millis() as u64,
            hold_ms: timing.hold.as_millis() as u64,
            phrases: [
                "金钱似乎总是指间沙，无论如何努力都填不满内心深处的匮乏深渊...",
                "在职场表演中耗尽了最后一丝生命力，却依然对未知的评价感到深深恐惧...",
                "试图在亲密关系中寻找救赎，却发现只是在对方的镜子里重复旧有的伤痛...",
                "当生活变成了一场无止境的追逐，我开始怀疑这一切繁荣背后的终极意义...",
                "无法停止对未来可能发生的‘最坏情况’进行灾难化预演，灵魂无法安放...",
                "感觉自己被囚禁在社会的矩阵剧本里，渴望收回主权却找不到出口...",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl PlaceholderConfig {
    pub fn timing(&self) -> PlaceholderTiming {
        PlaceholderTiming {
            typing: Duration::from_millis(self.typing_ms),
            deleting: Duration::from_millis(self.deleting_ms),
            hold: Duration::from_millis(self.hold_ms),
        }
    }
}
