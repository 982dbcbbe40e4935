//! The narrative stream seam.
//!
//! A [`Narrator`] turns a laid spread into interpretation text, delivered in
//! order through a [`ChunkSink`]. The session only concatenates what it
//! receives; it never looks inside the text.

mod template;

use std::fmt::Write as _;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use arcanum_core::{DrawnCard, PersonalizationSnapshot, SpreadDefinition, SpreadPosition};

use crate::effect::ReadingOrder;
use crate::error::NarratorResult;
use crate::event::SessionEvent;

pub use template::TemplateNarrator;

/// Produces interpretation text for a reading.
///
/// Implementations call [`ChunkSink::send`] zero or more times, in order,
/// then return. Concatenating the chunks must give the full text. After
/// returning an error no further chunks may be sent.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Stream the reading for `request` into `sink`.
    async fn stream_reading(&self, request: &ReadingRequest, sink: &ChunkSink)
    -> NarratorResult<()>;
}

/// Everything a narrator is given to work from.
#[derive(Debug, Clone)]
pub struct ReadingRequest {
    /// Epoch of the generation.
    pub epoch: u64,
    /// The querent's question.
    pub question: String,
    /// The spread laid.
    pub spread: &'static SpreadDefinition,
    /// Cards in position order.
    pub cards: Vec<DrawnCard>,
    /// Profile and recent history, possibly empty.
    pub personalization: PersonalizationSnapshot,
}

impl ReadingRequest {
    /// Build a request from the session's order plus a personalization
    /// snapshot.
    pub fn from_order(order: ReadingOrder, personalization: PersonalizationSnapshot) -> Self {
        Self {
            epoch: order.epoch,
            question: order.question,
            spread: order.spread.definition(),
            cards: order.cards,
            personalization,
        }
    }

    /// Each position paired with the card dealt into it.
    pub fn placements(&self) -> impl Iterator<Item = (&'static SpreadPosition, &DrawnCard)> {
        self.spread.positions.iter().zip(&self.cards)
    }

    /// The name to address the querent by, if known.
    pub fn querent_name(&self) -> Option<&str> {
        self.personalization
            .profile
            .as_ref()
            .map(|p| p.name.trim())
            .filter(|n| !n.is_empty())
    }

    /// Numbered list of positions, cards, and orientations.
    pub fn card_descriptions(&self) -> String {
        let mut out = String::new();
        for (i, (position, card)) in self.placements().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = write!(
                out,
                "{}. Position: \"{}\" ({})\n   Card: {}\n   Orientation: {}",
                i + 1,
                position.name,
                position.description,
                card.name(),
                card.orientation()
            );
        }
        out
    }

    /// Who is asking, what they care about, and what they asked recently.
    pub fn querent_context(&self) -> String {
        let Some(profile) = &self.personalization.profile else {
            return "Querent: Anonymous Traveler.".to_string();
        };

        let mut out = format!("Querent Name: {}", profile.name);
        if let Some(age) = profile.age {
            let _ = write!(out, "\nQuerent Age: {age}");
        }
        if let Some(soul) = &profile.soul_profile {
            let _ = write!(
                out,
                "\nCore Values: {}\nDeepest Fear: {}\nCurrent Goal: {}\nCurrent Struggle: {}\nDecision Style: {}",
                soul.core_values, soul.deepest_fear, soul.current_goal, soul.struggle, soul.decision_style
            );
        }
        if !self.personalization.history.is_empty() {
            out.push_str("\nRecent Readings:");
            for log in &self.personalization.history {
                let _ = write!(
                    out,
                    "\n- {} \"{}\" ({}): {}",
                    log.date.format("%Y-%m-%d"),
                    log.question,
                    log.spread_name,
                    log.summary
                );
            }
        }
        out
    }
}

/// Where a narrator delivers text. Bound to one generation's epoch.
#[derive(Debug, Clone)]
pub struct ChunkSink {
    epoch: u64,
    tx: UnboundedSender<SessionEvent>,
}

impl ChunkSink {
    /// A sink that forwards chunks, tagged with `epoch`, into `tx`.
    pub fn new(epoch: u64, tx: UnboundedSender<SessionEvent>) -> Self {
        Self { epoch, tx }
    }

    /// A sink plus the receiving end of its channel.
    pub fn channel(epoch: u64) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(epoch, tx), rx)
    }

    /// The epoch this sink tags chunks with.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Deliver a chunk. Empty chunks are skipped.
    ///
    /// Returns `false` once the receiving side is gone, in which case the
    /// narrator may stop early.
    pub fn send(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.is_empty() {
            return !self.tx.is_closed();
        }
        self.tx
            .send(SessionEvent::ReadingChunk {
                epoch: self.epoch,
                text,
            })
            .is_ok()
    }
}
