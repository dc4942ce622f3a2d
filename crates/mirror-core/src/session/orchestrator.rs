use super::state::{SessionState, StartRejection};
use crate::calibration::CalibrationResult;
use crate::catalog::{CatalogIndex, CatalogResolver};
use crate::error::MirrorError;
use crate::history::{HistoryItem, HistoryStore};
use crate::playback::PlaybackCoordinator;
use crate::validator::ResultValidator;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Drives one session through `Idle → Loading → Ready | Failed → Idle`.
///
/// `SessionOrchestrator` is responsible for:
/// - Guarding against a second calibration while one is in flight
/// - Validating and resolving backend answers
/// - Classifying every failure into the `Failed` state
/// - Recording completed calibrations in the history
/// - Holding the input buffer
///
/// It performs no I/O. The caller issues the backend call between
/// [`start_calibration`](Self::start_calibration) and
/// [`on_success`](Self::on_success) / [`on_failure`](Self::on_failure).
pub struct SessionOrchestrator {
    state: SessionState,
    input: String,
    history: HistoryStore,
    catalog: Arc<CatalogIndex>,
}

impl SessionOrchestrator {
    pub fn new(catalog: Arc<CatalogIndex>, history_capacity: NonZeroUsize) -> Self {
        Self {
            state: SessionState::Idle,
            input: String::new(),
            history: HistoryStore::new(history_capacity),
            catalog,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Text currently typed but not yet submitted (or kept after a failure).
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn catalog(&self) -> &Arc<CatalogIndex> {
        &self.catalog
    }

    /// Moves `Idle | Failed` to `Loading` and returns the trimmed text to submit.
    ///
    /// # Errors
    ///
    /// Leaves the state unchanged and returns the reason when the text is
    /// blank, a calibration is in flight, or a result is still on display.
    pub fn start_calibration(&mut self, text: &str) -> Result<String, StartRejection> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(StartRejection::BlankInput);
        }

        match self.state {
            SessionState::Idle | SessionState::Failed { .. } => {}
            SessionState::Loading { .. } => {
                tracing::warn!("Calibration already in flight, ignoring new submission");
                return Err(StartRejection::InFlight);
            }
            SessionState::Ready { .. } => return Err(StartRejection::ResultShowing),
        }

        self.input = text.to_string();
        self.state = SessionState::Loading {
            input_text: trimmed.to_string(),
        };
        tracing::info!(chars = trimmed.chars().count(), "Calibration started");

        Ok(trimmed.to_string())
    }

    /// Feeds the backend's raw answer into the session.
    ///
    /// A valid answer moves the session to `Ready`, appends a history entry,
    /// clears the input buffer and asks `playback` to start the ambient loop
    /// if nothing else is playing. An invalid answer moves it to `Failed`.
    pub fn on_success(&mut self, raw_text: &str, playback: &mut PlaybackCoordinator) -> &SessionState {
        let SessionState::Loading { input_text } = &self.state else {
            tracing::warn!(state = self.state.name(), "Ignoring backend answer outside of loading");
            return &self.state;
        };
        let input_text = input_text.clone();

        match ResultValidator::parse(raw_text) {
            Ok(result) => self.enter_ready(input_text, result, playback),
            Err(error) => {
                tracing::debug!(raw = %raw_text, "Rejected backend answer");
                self.enter_failed(error);
            }
        }

        &self.state
    }

    /// Records a failed backend call.
    pub fn on_failure(&mut self, error: MirrorError) -> &SessionState {
        if !self.state.is_loading() {
            tracing::warn!(state = self.state.name(), "Ignoring failure outside of loading: {}", error);
            return &self.state;
        }
        self.enter_failed(error);
        &self.state
    }

    /// Returns to `Idle` from `Ready` or `Failed`.
    ///
    /// Does nothing while loading. Playback and history are left as they are.
    pub fn reset(&mut self) -> &SessionState {
        match self.state {
            SessionState::Ready { .. } | SessionState::Failed { .. } => {
                tracing::info!(from = self.state.name(), "Session reset");
                self.state = SessionState::Idle;
            }
            SessionState::Loading { .. } => {
                tracing::warn!("Reset ignored while a calibration is in flight");
            }
            SessionState::Idle => {}
        }
        &self.state
    }

    fn enter_ready(
        &mut self,
        input_text: String,
        result: CalibrationResult,
        playback: &mut PlaybackCoordinator,
    ) {
        let result = Arc::new(result);
        let recommendation = CatalogResolver::resolve(&result, &self.catalog);
        tracing::info!(
            book = %recommendation.book.title,
            track = %recommendation.track.title,
            "Calibration ready"
        );

        self.history
            .append(HistoryItem::new(input_text, Arc::clone(&result)));
        self.input.clear();
        self.state = SessionState::Ready {
            result,
            recommendation,
        };

        playback.start_ambient_if_idle();
    }

    fn enter_failed(&mut self, error: MirrorError) {
        tracing::error!("Calibration failed: {}", error);
        self.state = SessionState::Failed { error };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Book, Track};
    use crate::error::{BackendErrorKind, Result};
    use crate::playback::{ActiveSource, AudioChannel, AudioOutput};

    struct SilentOutput;

    impl AudioOutput for SilentOutput {
        fn start(&mut self, _channel: AudioChannel, _url: &str) -> Result<()> {
            Ok(())
        }

        fn stop(&mut self, _channel: AudioChannel) {}
    }

    const RAW: &str = "```json\n{\"frequencyScan\":\"A\",\"illusionStripping\":\"B\",\"fiveSteps\":[\"1\",\"2\",\"3\",\"4\",\"5\"],\"actionAnchor\":\"C\",\"recommendedBookTitle\":\"《当下的力量》\",\"recommendedMusicTitle\":\"Alpha Wave Focus\"}\n```";

    fn catalog() -> Arc<CatalogIndex> {
        let books = vec![
            Book {
                title: "《你值得过更好的生活》".to_string(),
                author: "罗伯特·谢费尔德".to_string(),
                description: String::new(),
            },
            Book {
                title: "《当下的力量》".to_string(),
                author: "埃克哈特·托利".to_string(),
                description: String::new(),
            },
        ];
        let tracks = vec![
            Track {
                title: "Deep Space 432Hz - Abundance".to_string(),
                url: "https://example.com/1.mp3".to_string(),
                category: String::new(),
            },
            Track {
                title: "Alpha Wave Focus".to_string(),
                url: "https://example.com/4.mp3".to_string(),
                category: String::new(),
            },
        ];
        Arc::new(CatalogIndex::new(1, books, tracks).unwrap())
    }

    fn setup() -> (SessionOrchestrator, PlaybackCoordinator) {
        let orchestrator = SessionOrchestrator::new(catalog(), NonZeroUsize::new(5).unwrap());
        let playback = PlaybackCoordinator::new(Box::new(SilentOutput), "https://example.com/bgm.mp3");
        (orchestrator, playback)
    }

    #[test]
    fn test_initial_state_is_idle() {
        let (session, _) = setup();
        assert!(session.state().is_idle());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let (mut session, _) = setup();
        assert_eq!(session.start_calibration("   \n"), Err(StartRejection::BlankInput));
        assert!(session.state().is_idle());
    }

    #[test]
    fn test_start_while_loading_is_rejected() {
        let (mut session, _) = setup();
        assert_eq!(session.start_calibration("  worried  ").unwrap(), "worried");
        assert_eq!(session.start_calibration("again"), Err(StartRejection::InFlight));
        assert_eq!(
            session.state(),
            &SessionState::Loading {
                input_text: "worried".to_string()
            }
        );
    }

    #[test]
    fn test_round_trip_reaches_ready() {
        let (mut session, mut playback) = setup();
        session.start_calibration("money slips away").unwrap();

        let state = session.on_success(RAW, &mut playback).clone();
        let SessionState::Ready {
            result,
            recommendation,
        } = state
        else {
            panic!("expected ready state");
        };

        assert_eq!(result.frequency_scan, "A");
        assert_eq!(result.illusion_stripping, "B");
        assert_eq!(result.five_steps, ["1", "2", "3", "4", "5"].map(String::from));
        assert_eq!(result.action_anchor, "C");
        assert_eq!(recommendation.book.title, "《当下的力量》");
        assert_eq!(recommendation.track.title, "Alpha Wave Focus");

        assert_eq!(session.history().len(), 1);
        let item = session.history().latest().unwrap();
        assert_eq!(item.input_text, "money slips away");
        assert!(Arc::ptr_eq(&item.result, &result));
        assert!(session.input().is_empty());
        assert!(playback.state().is_ambient_playing());
    }

    #[test]
    fn test_ready_keeps_catalog_track_playing() {
        let (mut session, mut playback) = setup();
        let track = Arc::clone(&session.catalog().tracks()[1]);
        playback.play_catalog_track(Arc::clone(&track));

        session.start_calibration("text").unwrap();
        session.on_success(RAW, &mut playback);

        assert_eq!(playback.state().active_source, ActiveSource::Catalog(track));
    }

    #[test]
    fn test_invalid_answer_fails_and_keeps_input() {
        let (mut session, mut playback) = setup();
        session.start_calibration("my concern").unwrap();

        let state = session.on_success("not json", &mut playback);
        assert!(state.error().unwrap().is_parse_error());
        assert_eq!(session.input(), "my concern");
        assert!(session.history().is_empty());
        assert_eq!(playback.state().active_source, ActiveSource::None);
    }

    #[test]
    fn test_backend_failure_then_resubmit() {
        let (mut session, mut playback) = setup();
        session.start_calibration("first").unwrap();
        session.on_failure(MirrorError::backend(BackendErrorKind::Network, "refused"));
        assert!(session.state().is_failed());

        session.start_calibration("second").unwrap();
        assert!(session.state().error().is_none());
        session.on_success(RAW, &mut playback);
        assert!(session.state().is_ready());
    }

    #[test]
    fn test_ready_rejects_start_until_reset() {
        let (mut session, mut playback) = setup();
        session.start_calibration("first").unwrap();
        session.on_success(RAW, &mut playback);

        assert_eq!(session.start_calibration("second"), Err(StartRejection::ResultShowing));

        assert!(session.reset().is_idle());
        assert_eq!(session.history().len(), 1);
        assert!(playback.state().is_ambient_playing());
        assert!(session.start_calibration("second").is_ok());
    }

    #[test]
    fn test_events_outside_loading_are_ignored() {
        let (mut session, mut playback) = setup();
        assert!(session.on_success(RAW, &mut playback).is_idle());
        assert!(session.on_failure(MirrorError::internal("late")).is_idle());

        session.start_calibration("text").unwrap();
        assert!(session.reset().is_loading());
    }

    #[test]
    fn test_failed_reset_clears_error() {
        let (mut session, _) = setup();
        session.start_calibration("text").unwrap();
        session.on_failure(MirrorError::config("missing key"));
        assert!(session.reset().error().is_none());
    }
}
