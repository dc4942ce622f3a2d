//! Audio output backed by an external player process.
//!
//! Each channel owns at most one child process. Stopping a channel kills
//! its process; a process that exits on its own is reported through
//! `has_finished`. Children are spawned on the tokio runtime and reaped by
//! it, so none of the trait methods block.

use mirror_core::config::PlayerConfig;
use mirror_core::playback::{AudioChannel, AudioOutput};
use mirror_core::{MirrorError, Result};
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::{Child, Command};

pub struct ProcessAudioOutput {
    player: PlayerConfig,
    children: HashMap<AudioChannel, Child>,
}

impl ProcessAudioOutput {
    pub fn new(player: PlayerConfig) -> Self {
        Self {
            player,
            children: HashMap::new(),
        }
    }

    fn command(&self, channel: AudioChannel, url: &str) -> Command {
        let mut command = Command::new(&self.player.command);
        command.args(&self.player.args);
        if channel == AudioChannel::Ambient {
            command.args(&self.player.loop_args);
        }
        command
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

impl AudioOutput for ProcessAudioOutput {
    fn start(&mut self, channel: AudioChannel, url: &str) -> Result<()> {
        self.stop(channel);

        let child = self.command(channel, url).spawn().map_err(|e| {
            MirrorError::io(format!("Failed to launch player `{}`: {}", self.player.command, e))
        })?;
        tracing::debug!(?channel, pid = ?child.id(), "Player started");

        self.children.insert(channel, child);
        Ok(())
    }

    fn stop(&mut self, channel: AudioChannel) {
        if let Some(mut child) = self.children.remove(&channel) {
            if let Err(e) = child.start_kill() {
                tracing::debug!(?channel, "Player already gone: {}", e);
            }
        }
    }

    fn has_finished(&mut self, channel: AudioChannel) -> bool {
        let exited = match self.children.get_mut(&channel) {
            Some(child) => matches!(child.try_wait(), Ok(Some(_)) | Err(_)),
            None => false,
        };
        if exited {
            self.children.remove(&channel);
        }
        exited
    }
}

/// Output that accepts every request and plays nothing.
///
/// Used by frontends that run a single calibration and exit.
#[derive(Debug, Default)]
pub struct MutedAudioOutput;

impl AudioOutput for MutedAudioOutput {
    fn start(&mut self, channel: AudioChannel, _url: &str) -> Result<()> {
        tracing::debug!(?channel, "Audio muted");
        Ok(())
    }

    fn stop(&mut self, _channel: AudioChannel) {}
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn player(command: &str, args: &[&str]) -> PlayerConfig {
        PlayerConfig {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            loop_args: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_player_is_io_error() {
        let mut output = ProcessAudioOutput::new(player("mirror-player-that-does-not-exist", &[]));
        let err = output.start(AudioChannel::Catalog, "https://example.com/a.mp3").unwrap_err();
        assert!(matches!(err, MirrorError::Io { .. }));
        assert!(!output.has_finished(AudioChannel::Catalog));
    }

    #[tokio::test]
    async fn test_finished_process_is_reported_once() {
        // `true` ignores its arguments and exits immediately
        let mut output = ProcessAudioOutput::new(player("true", &[]));
        output.start(AudioChannel::Catalog, "ignored").unwrap();

        let mut finished = false;
        for _ in 0..100 {
            if output.has_finished(AudioChannel::Catalog) {
                finished = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(finished);
        assert!(!output.has_finished(AudioChannel::Catalog));
    }

    #[tokio::test]
    async fn test_stop_kills_running_process() {
        // `sleep 30` stands in for a long track
        let mut output = ProcessAudioOutput::new(player("sleep", &[]));
        output.start(AudioChannel::Ambient, "30").unwrap();
        assert!(!output.has_finished(AudioChannel::Ambient));

        let started = Instant::now();
        output.stop(AudioChannel::Ambient);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!output.has_finished(AudioChannel::Ambient));
    }

    #[tokio::test]
    async fn test_restart_replaces_channel_process() {
        let mut output = ProcessAudioOutput::new(player("sleep", &[]));
        output.start(AudioChannel::Catalog, "30").unwrap();
        output.start(AudioChannel::Catalog, "30").unwrap();
        assert_eq!(output.children.len(), 1);

        drop(output);
    }
}
