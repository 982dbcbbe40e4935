//! Core types for Arcanum: the tarot deck, the spread catalog, and the
//! shuffle engine.
//!
//! Everything here is plain data or a pure function of a random source. The
//! card and spread catalogs are built once and shared read-only; the
//! interactive flow that consumes them lives in `arcanum-session`.

/// Card identity, suits, and drawn (orientation-annotated) cards.
pub mod card;
/// The fixed 78-card catalog.
pub mod deck;
/// Error types used throughout the crate.
pub mod error;
/// Profile, preferences, and reading history value objects.
pub mod profile;
/// Shuffling and reversal assignment.
pub mod shuffle;
/// Spread definitions and their positions.
pub mod spread;

/// Re-export card types.
pub use card::{CardDefinition, DrawnCard, Suit};
/// Re-export the deck catalog.
pub use deck::{Deck, deck};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export personalization types.
pub use profile::{
    AiPreferences, DecisionStyle, PersonalizationSnapshot, ReadingCard, ReadingLog, ReadingStyle,
    Skepticism, SoulProfile, UserProfile, Verbosity,
};
/// Re-export the shuffle engine.
pub use shuffle::{DEFAULT_REVERSAL_CHANCE, shuffle_deck};
/// Re-export spread types.
pub use spread::{SpreadDefinition, SpreadKind, SpreadPosition};
