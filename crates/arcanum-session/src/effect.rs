//! Outputs of the session state machine.
//!
//! Some effects only inform the renderer ([`Effect::StateChanged`],
//! [`Effect::CardDrawn`]); others are commands the host must carry out
//! ([`Effect::ScheduleTimer`], [`Effect::CancelTimers`],
//! [`Effect::BeginReading`], [`Effect::RecordHistory`]).

use std::time::Duration;

use arcanum_core::{DrawnCard, ReadingLog, SpreadKind, SpreadPosition};

use crate::event::Timer;
use crate::state::SessionState;

/// Why the session refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The question was empty or whitespace.
    BlankQuestion,
}

/// Everything a narrator needs to know about the spread on the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingOrder {
    /// Epoch the generation belongs to.
    pub epoch: u64,
    /// The querent's question.
    pub question: String,
    /// The spread laid.
    pub spread: SpreadKind,
    /// Cards in position order.
    pub cards: Vec<DrawnCard>,
}

/// How a generation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingOutcome {
    /// All text arrived.
    Complete,
    /// The narrator failed; any partial text stays visible.
    Failed(String),
}

/// Something that happened, or that the host must do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The session moved between states.
    StateChanged {
        /// Previous state.
        from: SessionState,
        /// New state.
        to: SessionState,
    },
    /// An action was refused and the caller should re-prompt.
    Rejected(Rejection),
    /// Schedule a timer to fire after `delay`.
    ScheduleTimer {
        /// Which timer.
        timer: Timer,
        /// How long from now.
        delay: Duration,
        /// Epoch to tag the firing with.
        epoch: u64,
    },
    /// Drop every pending timer.
    CancelTimers,
    /// A card was dealt into a position.
    CardDrawn {
        /// Zero-based position index.
        index: usize,
        /// The card.
        card: DrawnCard,
        /// The position it fills.
        position: SpreadPosition,
    },
    /// The cards on the table turned face up.
    CardsRevealed,
    /// Start generating the interpretation.
    BeginReading(ReadingOrder),
    /// More interpretation text was appended.
    ReadingUpdated {
        /// The newly appended text.
        appended: String,
    },
    /// The generation ended.
    ReadingFinished(ReadingOutcome),
    /// Persist a summary of the completed reading.
    RecordHistory(ReadingLog),
}
