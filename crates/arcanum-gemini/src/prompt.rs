//! Prompt text for the oracle.

use arcanum_core::{AiPreferences, ReadingStyle, Skepticism, Verbosity};
use arcanum_session::ReadingRequest;

const ORACLE_PERSONA: &str = "\
You are the Oracle of Arcanum, an old and empathetic Tarot reader.
Give readings that are insightful, honest, and kind, grounded in the cards that were drawn.

Structure every reading the same way:
- **The Overview**: two sentences on the overall energy of the spread.
- **The Cards**: one section per card, headed \"### Card Name (Position Name)\". Explain the upright or reversed meaning and how it answers that position.
- **The Synthesis**: a closing paragraph that weaves the cards into practical advice.

Reversed cards are not simply bad omens. Read them as inward energy, delay, or a block to be worked through.
Answer in Markdown and use bold for emphasis.
Never describe yourself as an AI or talk about generating text. Speak only as the voice of the cards.";

/// The system instruction, tuned by the querent's preferences.
pub fn system_instruction(preferences: Option<&AiPreferences>) -> String {
    let preferences = preferences.copied().unwrap_or_default();
    let mut out = String::from(ORACLE_PERSONA);
    out.push_str("\n\nVoice:\n- ");
    out.push_str(match preferences.style {
        ReadingStyle::Psychological => {
            "Treat the cards as archetypes and mirrors of the querent's inner life."
        }
        ReadingStyle::Esoteric => {
            "Draw on traditional symbolism, elemental and astrological correspondences."
        }
        ReadingStyle::Balanced => "Blend traditional symbolism with practical psychology.",
    });
    out.push_str("\n- ");
    out.push_str(match preferences.verbosity {
        Verbosity::Concise => "Keep it brief: a few sentences per card.",
        Verbosity::Detailed => "Be thorough and explore each card in depth.",
    });
    out.push_str("\n- ");
    out.push_str(match preferences.skepticism {
        Skepticism::Believer => "Speak with the calm certainty of a mystic.",
        Skepticism::Analytical => {
            "Frame the cards as prompts for reflection rather than predictions."
        }
    });
    out
}

/// The user turn: who asks, what they ask, and which cards fell where.
pub fn reading_prompt(request: &ReadingRequest) -> String {
    format!(
        "{context}\nUser Question: \"{question}\"\nSpread Type: {spread}\n\nCards Drawn:\n{cards}\n\n\
         Please give a detailed Arcanum reading following the system instructions. \
         Address the querent by name if one is given.",
        context = request.querent_context(),
        question = request.question,
        spread = request.spread.name,
        cards = request.card_descriptions(),
    )
}
