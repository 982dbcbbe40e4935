//! Session lifecycle states.

use std::fmt;

/// Where a session is in its lifecycle.
///
/// Transitions only move forward, except for reset, which returns to
/// [`SessionState::Intro`] from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Waiting for the querent to begin.
    #[default]
    Intro,
    /// Editing the question and choosing a spread.
    Selection,
    /// The deck is being shuffled.
    Shuffling,
    /// Cards are dealt one at a time.
    Drawing,
    /// All cards are on the table and turning face up.
    Revealing,
    /// The interpretation is streaming in, or has finished.
    Reading,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Intro => "Intro",
            SessionState::Selection => "Selection",
            SessionState::Shuffling => "Shuffling",
            SessionState::Drawing => "Drawing",
            SessionState::Revealing => "Revealing",
            SessionState::Reading => "Reading",
        };
        f.write_str(name)
    }
}

/// Progress of the interpretation within the Reading state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadingStatus {
    /// No generation requested yet.
    #[default]
    Idle,
    /// A generation is in flight.
    Streaming,
    /// The narrator finished.
    Complete,
    /// The narrator gave up; the message describes why.
    Failed(String),
}

impl ReadingStatus {
    /// Whether no more text will arrive.
    pub fn is_finished(&self) -> bool {
        matches!(self, ReadingStatus::Complete | ReadingStatus::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_intro() {
        assert_eq!(SessionState::default(), SessionState::Intro);
        assert_eq!(SessionState::Revealing.to_string(), "Revealing");
    }

    #[test]
    fn finished_statuses() {
        assert!(!ReadingStatus::Idle.is_finished());
        assert!(!ReadingStatus::Streaming.is_finished());
        assert!(ReadingStatus::Complete.is_finished());
        assert!(ReadingStatus::Failed("quota".into()).is_finished());
    }
}
