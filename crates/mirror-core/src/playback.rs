//! Mutual exclusion between the ambient loop and catalog tracks.
//!
//! [`PlaybackCoordinator`] is the only writer of [`PlaybackState`]. Every
//! operation stops the current source before starting another one, so the
//! audio output never has both channels running.

use crate::catalog::Track;
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;

/// The two independent outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioChannel {
    /// The looping background track.
    Ambient,
    /// A track picked from the catalog.
    Catalog,
}

/// Something that can actually make sound.
pub trait AudioOutput: Send {
    /// Starts `url` on `channel`. Anything already running there is replaced.
    fn start(&mut self, channel: AudioChannel, url: &str) -> Result<()>;

    /// Stops `channel`. Stopping an idle channel is a no-op.
    fn stop(&mut self, channel: AudioChannel);

    /// Reports whether the source on `channel` ended by itself.
    fn has_finished(&mut self, _channel: AudioChannel) -> bool {
        false
    }
}

/// Which source, if any, is audible.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", content = "track")]
pub enum ActiveSource {
    #[default]
    None,
    Ambient,
    Catalog(Arc<Track>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub active_source: ActiveSource,
}

impl PlaybackState {
    pub fn is_ambient_playing(&self) -> bool {
        matches!(self.active_source, ActiveSource::Ambient)
    }

    /// The catalog track currently playing.
    pub fn catalog_track(&self) -> Option<&Arc<Track>> {
        match &self.active_source {
            ActiveSource::Catalog(track) => Some(track),
            _ => None,
        }
    }
}

pub struct PlaybackCoordinator {
    state: PlaybackState,
    output: Box<dyn AudioOutput>,
    ambient_url: String,
}

impl PlaybackCoordinator {
    pub fn new(output: Box<dyn AudioOutput>, ambient_url: impl Into<String>) -> Self {
        Self {
            state: PlaybackState::default(),
            output,
            ambient_url: ambient_url.into(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Starts the ambient loop, stopping any catalog track first.
    pub fn play_ambient(&mut self) {
        if self.state.is_ambient_playing() {
            return;
        }
        self.stop_active();

        match self.output.start(AudioChannel::Ambient, &self.ambient_url) {
            Ok(()) => {
                tracing::info!("Ambient loop started");
                self.state.active_source = ActiveSource::Ambient;
            }
            Err(e) => {
                tracing::warn!("Failed to start ambient loop: {}", e);
                self.state.active_source = ActiveSource::None;
            }
        }
    }

    /// Plays a catalog track.
    ///
    /// Called with the track that is already playing, this pauses it instead.
    /// Any other source is stopped before the new track starts.
    pub fn play_catalog_track(&mut self, track: Arc<Track>) {
        if let Some(current) = self.state.catalog_track()
            && current.title == track.title
        {
            tracing::info!(title = %track.title, "Catalog track paused");
            self.stop_active();
            return;
        }
        self.stop_active();

        match self.output.start(AudioChannel::Catalog, &track.url) {
            Ok(()) => {
                tracing::info!(title = %track.title, "Catalog track started");
                self.state.active_source = ActiveSource::Catalog(track);
            }
            Err(e) => {
                tracing::warn!(title = %track.title, "Failed to start catalog track: {}", e);
                self.state.active_source = ActiveSource::None;
            }
        }
    }

    /// Silences everything.
    pub fn stop_all(&mut self) {
        self.stop_active();
    }

    /// Flips the ambient loop. Turning it on stops any catalog track.
    pub fn toggle_ambient(&mut self) {
        if self.state.is_ambient_playing() {
            tracing::info!("Ambient loop stopped");
            self.stop_active();
        } else {
            self.play_ambient();
        }
    }

    /// Starts the ambient loop only when nothing is playing.
    pub fn start_ambient_if_idle(&mut self) {
        if self.state.active_source == ActiveSource::None {
            self.play_ambient();
        }
    }

    /// The catalog track reached its end. Ambient does not resume.
    pub fn track_finished(&mut self) {
        if let ActiveSource::Catalog(track) = &self.state.active_source {
            tracing::info!(title = %track.title, "Catalog track finished");
            self.stop_active();
        }
    }

    /// Asks the output whether the active source ended on its own and
    /// updates the state. Returns true when the state changed.
    pub fn poll(&mut self) -> bool {
        match self.state.active_source {
            ActiveSource::Catalog(_) if self.output.has_finished(AudioChannel::Catalog) => {
                self.track_finished();
                true
            }
            ActiveSource::Ambient if self.output.has_finished(AudioChannel::Ambient) => {
                tracing::warn!("Ambient loop ended unexpectedly");
                self.stop_active();
                true
            }
            _ => false,
        }
    }

    fn stop_active(&mut self) {
        match std::mem::take(&mut self.state.active_source) {
            ActiveSource::None => {}
            ActiveSource::Ambient => self.output.stop(AudioChannel::Ambient),
            ActiveSource::Catalog(_) => self.output.stop(AudioChannel::Catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MirrorError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Shared {
        running: HashSet<AudioChannel>,
        max_concurrent: usize,
        starts: Vec<String>,
        finished: HashSet<AudioChannel>,
        fail_urls: HashSet<String>,
    }

    // Mock output that records which channels are running
    #[derive(Clone, Default)]
    struct RecordingOutput(Arc<Mutex<Shared>>);

    impl AudioOutput for RecordingOutput {
        fn start(&mut self, channel: AudioChannel, url: &str) -> Result<()> {
            let mut shared = self.0.lock().unwrap();
            if shared.fail_urls.contains(url) {
                return Err(MirrorError::io("player missing"));
            }
            shared.running.insert(channel);
            shared.max_concurrent = shared.max_concurrent.max(shared.running.len());
            shared.starts.push(url.to_string());
            Ok(())
        }

        fn stop(&mut self, channel: AudioChannel) {
            self.0.lock().unwrap().running.remove(&channel);
        }

        fn has_finished(&mut self, channel: AudioChannel) -> bool {
            self.0.lock().unwrap().finished.remove(&channel)
        }
    }

    fn track(title: &str) -> Arc<Track> {
        Arc::new(Track {
            title: title.to_string(),
            url: format!("https://example.com/{title}.mp3"),
            category: String::new(),
        })
    }

    fn coordinator() -> (PlaybackCoordinator, RecordingOutput) {
        let output = RecordingOutput::default();
        let coordinator = PlaybackCoordinator::new(Box::new(output.clone()), "https://example.com/bgm.mp3");
        (coordinator, output)
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Ambient,
        PlayA,
        PlayB,
        Stop,
        Toggle,
        AmbientIfIdle,
        Finish,
    }

    const OPS: [Op; 7] = [
        Op::Ambient,
        Op::PlayA,
        Op::PlayB,
        Op::Stop,
        Op::Toggle,
        Op::AmbientIfIdle,
        Op::Finish,
    ];

    fn apply(playback: &mut PlaybackCoordinator, output: &RecordingOutput, op: Op) {
        match op {
            Op::Ambient => playback.play_ambient(),
            Op::PlayA => playback.play_catalog_track(track("a")),
            Op::PlayB => playback.play_catalog_track(track("b")),
            Op::Stop => playback.stop_all(),
            Op::Toggle => playback.toggle_ambient(),
            Op::AmbientIfIdle => playback.start_ambient_if_idle(),
            Op::Finish => {
                // whatever is audible ends on its own
                {
                    let mut shared = output.0.lock().unwrap();
                    let ended: Vec<_> = shared.running.drain().collect();
                    shared.finished.extend(ended);
                }
                playback.poll();
            }
        }
    }

    #[test]
    fn test_sources_are_mutually_exclusive() {
        for len in 1..=4u32 {
            for mut code in 0..OPS.len().pow(len) {
                let (mut playback, output) = coordinator();
                let mut sequence = Vec::new();

                for _ in 0..len {
                    let op = OPS[code % OPS.len()];
                    code /= OPS.len();
                    sequence.push(op);
                    apply(&mut playback, &output, op);

                    let shared = output.0.lock().unwrap();
                    assert!(shared.max_concurrent <= 1, "overlap after {sequence:?}");
                    let expected: HashSet<AudioChannel> = match playback.state().active_source {
                        ActiveSource::None => HashSet::new(),
                        ActiveSource::Ambient => HashSet::from([AudioChannel::Ambient]),
                        ActiveSource::Catalog(_) => HashSet::from([AudioChannel::Catalog]),
                    };
                    assert_eq!(shared.running, expected, "state drifted after {sequence:?}");
                }
            }
        }
    }

    #[test]
    fn test_same_track_toggles_off() {
        let (mut playback, output) = coordinator();
        let a = track("a");

        playback.play_catalog_track(a.clone());
        assert_eq!(playback.state().catalog_track().unwrap().title, "a");

        playback.play_catalog_track(a);
        assert_eq!(playback.state().active_source, ActiveSource::None);
        assert!(output.0.lock().unwrap().running.is_empty());
    }

    #[test]
    fn test_different_track_switches() {
        let (mut playback, output) = coordinator();
        playback.play_catalog_track(track("a"));
        playback.play_catalog_track(track("b"));
        assert_eq!(playback.state().catalog_track().unwrap().title, "b");
        assert_eq!(output.0.lock().unwrap().starts.len(), 2);
    }

    #[test]
    fn test_track_completion_does_not_resume_ambient() {
        let (mut playback, output) = coordinator();
        playback.play_ambient();
        playback.play_catalog_track(track("a"));

        output.0.lock().unwrap().finished.insert(AudioChannel::Catalog);
        assert!(playback.poll());
        assert_eq!(playback.state().active_source, ActiveSource::None);
        assert!(!playback.poll());
    }

    #[test]
    fn test_toggle_ambient() {
        let (mut playback, _output) = coordinator();
        playback.toggle_ambient();
        assert!(playback.state().is_ambient_playing());
        playback.toggle_ambient();
        assert_eq!(playback.state().active_source, ActiveSource::None);
    }

    #[test]
    fn test_start_ambient_if_idle_respects_catalog_track() {
        let (mut playback, _output) = coordinator();
        playback.play_catalog_track(track("a"));
        playback.start_ambient_if_idle();
        assert!(playback.state().catalog_track().is_some());

        playback.stop_all();
        playback.start_ambient_if_idle();
        assert!(playback.state().is_ambient_playing());
    }

    #[test]
    fn test_failed_start_leaves_nothing_playing() {
        let (mut playback, output) = coordinator();
        output
            .0
            .lock()
            .unwrap()
            .fail_urls
            .insert("https://example.com/bgm.mp3".to_string());

        playback.play_ambient();
        assert_eq!(playback.state().active_source, ActiveSource::None);
    }

    #[test]
    fn test_failed_catalog_start_leaves_nothing_playing() {
        let (mut playback, output) = coordinator();
        playback.play_ambient();
        output
            .0
            .lock()
            .unwrap()
            .fail_urls
            .insert("https://example.com/a.mp3".to_string());

        playback.play_catalog_track(track("a"));
        assert_eq!(playback.state().active_source, ActiveSource::None);
        assert!(output.0.lock().unwrap().running.is_empty());

        // a later track still plays
        playback.play_catalog_track(track("b"));
        assert_eq!(playback.state().catalog_track().unwrap().title, "b");
    }
}
