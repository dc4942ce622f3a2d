//! Typewriter cycling of preset concerns for the empty input prompt.
//!
//! Purely cosmetic. The animator knows nothing about sessions; whoever
//! drives it decides when to pause.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderTiming {
    /// Delay after each typed character.
    pub typing: Duration,
    /// Delay after each deleted character.
    pub deleting: Duration,
    /// How long a fully typed phrase stays up.
    pub hold: Duration,
}

impl Default for PlaceholderTiming {
    fn default() -> Self {
        Self {
            typing: Duration::from_millis(100),
            deleting: Duration::from_millis(30),
            hold: Duration::from_millis(3000),
        }
    }
}

/// What to show now and how long until the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub next_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Typing,
    Deleting,
}

#[derive(Debug, Clone)]
pub struct PlaceholderAnimator {
    phrases: Vec<Vec<char>>,
    timing: PlaceholderTiming,
    phrase_index: usize,
    char_index: usize,
    phase: Phase,
}

impl PlaceholderAnimator {
    pub fn new<I, S>(phrases: I, timing: PlaceholderTiming) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().chars().collect())
                .collect(),
            timing,
            phrase_index: 0,
            char_index: 0,
            phase: Phase::Typing,
        }
    }

    /// The text currently displayed.
    pub fn current_text(&self) -> String {
        self.phrases
            .get(self.phrase_index)
            .map(|chars| chars[..self.char_index].iter().collect())
            .unwrap_or_default()
    }

    /// Advances one step.
    pub fn tick(&mut self) -> Frame {
        let Some(len) = self.phrases.get(self.phrase_index).map(Vec::len) else {
            return self.frame(self.timing.typing);
        };

        match self.phase {
            Phase::Typing if self.char_index < len => {
                self.char_index += 1;
                self.frame(self.timing.typing)
            }
            Phase::Typing => {
                self.phase = Phase::Deleting;
                self.frame(self.timing.hold)
            }
            Phase::Deleting if self.char_index > 0 => {
                self.char_index -= 1;
                self.frame(self.timing.deleting)
            }
            Phase::Deleting => {
                self.phase = Phase::Typing;
                self.phrase_index = (self.phrase_index + 1) % self.phrases.len();
                self.frame(self.timing.typing)
            }
        }
    }

    fn frame(&self, next_delay: Duration) -> Frame {
        Frame {
            text: self.current_text(),
            next_delay,
        }
    }
}
