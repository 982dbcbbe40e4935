//! Gemini-backed narrator for Arcanum.
//!
//! [`GeminiNarrator`] sends the reading prompt to the Gemini
//! `streamGenerateContent` endpoint and forwards each server-sent event's
//! text to the session as it arrives.

mod narrator;
mod prompt;
mod sse;

pub use narrator::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, GeminiNarrator};
pub use prompt::{reading_prompt, system_instruction};
