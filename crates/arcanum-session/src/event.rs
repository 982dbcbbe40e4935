//! Inputs to the session state machine.

use arcanum_core::SpreadKind;

/// Something the caller asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Leave the intro screen.
    StartSelection,
    /// Replace the draft question.
    EditQuestion(String),
    /// Change the draft spread.
    SelectSpread(SpreadKind),
    /// Submit the current draft question and spread.
    Submit,
    /// Submit an explicit question and spread in one step.
    SubmitQuestionAndSpread {
        /// The question to ask.
        question: String,
        /// The spread to lay.
        spread: SpreadKind,
    },
    /// Deal the next card from the deck.
    DrawNextCard,
    /// Abandon everything and return to the intro.
    Reset,
}

/// The session's scheduled transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Shuffling → Drawing.
    Shuffle,
    /// Pause after the final draw, then Drawing → Revealing.
    FinishDraw,
    /// Turn the cards face up while Revealing.
    RevealFlip,
    /// Revealing → Reading.
    BeginReading,
}

/// A single input to [`Session::handle`](crate::Session::handle).
///
/// Everything except [`SessionEvent::Action`] carries the epoch it was
/// launched under; events from an older epoch are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A caller action.
    Action(Action),
    /// A scheduled timer elapsed.
    TimerFired {
        /// Which timer.
        timer: Timer,
        /// Epoch at scheduling time.
        epoch: u64,
    },
    /// The narrator produced more text.
    ReadingChunk {
        /// Epoch of the generation.
        epoch: u64,
        /// The text to append.
        text: String,
    },
    /// The narrator finished successfully.
    ReadingCompleted {
        /// Epoch of the generation.
        epoch: u64,
    },
    /// The narrator gave up.
    ReadingFailed {
        /// Epoch of the generation.
        epoch: u64,
        /// Why it failed.
        message: String,
    },
}

impl SessionEvent {
    /// The epoch tag, or `None` for caller actions.
    pub fn epoch(&self) -> Option<u64> {
        match self {
            SessionEvent::Action(_) => None,
            SessionEvent::TimerFired { epoch, .. }
            | SessionEvent::ReadingChunk { epoch, .. }
            | SessionEvent::ReadingCompleted { epoch }
            | SessionEvent::ReadingFailed { epoch, .. } => Some(*epoch),
        }
    }

    /// Whether this event ends a generation (successfully or not).
    pub fn ends_generation(&self) -> bool {
        matches!(
            self,
            SessionEvent::ReadingCompleted { .. } | SessionEvent::ReadingFailed { .. }
        )
    }
}

impl From<Action> for SessionEvent {
    fn from(action: Action) -> Self {
        SessionEvent::Action(action)
    }
}
