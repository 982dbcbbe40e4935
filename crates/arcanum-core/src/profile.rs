//! Personalization value objects: the querent's profile, their reading
//! preferences, and a bounded history of past readings.
//!
//! The session never mutates these. It forwards a [`PersonalizationSnapshot`]
//! to the narrator and hands back a new [`ReadingLog`] when a reading
//! completes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::DrawnCard;
use crate::error::CoreError;
use crate::spread::SpreadDefinition;

/// How the querent tends to make decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecisionStyle {
    /// Reason first.
    Head,
    /// Feeling first.
    Heart,
    /// Gut first.
    #[default]
    Intuition,
}

/// Answers to the onboarding questions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoulProfile {
    /// e.g. "Freedom, Creativity".
    pub core_values: String,
    /// e.g. "Stagnation".
    pub deepest_fear: String,
    /// e.g. "Launching a startup".
    pub current_goal: String,
    /// How the querent decides.
    pub decision_style: DecisionStyle,
    /// Current major challenge.
    pub struggle: String,
}

impl SoulProfile {
    /// Whether every free-text answer has been filled in.
    pub fn is_complete(&self) -> bool {
        [
            &self.core_values,
            &self.deepest_fear,
            &self.current_goal,
            &self.struggle,
        ]
        .iter()
        .all(|s| !s.trim().is_empty())
    }
}

/// Interpretive lens for the reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadingStyle {
    /// Jungian, archetypal.
    Psychological,
    /// Traditional occult symbolism.
    Esoteric,
    /// A mix of both.
    #[default]
    Balanced,
}

/// How long the reading should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Short.
    Concise,
    /// Long-form.
    #[default]
    Detailed,
}

/// Tone of voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Skepticism {
    /// Speaks as if the cards are literally true.
    #[default]
    Believer,
    /// Frames the cards as prompts for reflection.
    Analytical,
}

/// Narrator preferences chosen by the querent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiPreferences {
    /// Interpretive lens.
    pub style: ReadingStyle,
    /// Target length.
    pub verbosity: Verbosity,
    /// Tone of voice.
    pub skepticism: Skepticism,
}

/// A stored user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable user id.
    pub id: String,
    /// Name the narrator addresses.
    pub name: String,
    /// Age, if shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Onboarding answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soul_profile: Option<SoulProfile>,
    /// Narrator preferences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<AiPreferences>,
}

impl UserProfile {
    /// Create a profile with only an id and a display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age: None,
            soul_profile: None,
            preferences: None,
        }
    }
}

/// One card of a past reading, flattened for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingCard {
    /// Card name.
    pub name: String,
    /// Position name in the spread.
    pub position: String,
    /// Whether the card was reversed.
    pub is_reversed: bool,
}

/// A past reading, kept short so that several fit into a narrator prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingLog {
    /// Unique id.
    pub id: Uuid,
    /// When the reading completed.
    pub date: DateTime<Utc>,
    /// The question asked.
    pub question: String,
    /// Display name of the spread.
    pub spread_name: String,
    /// Cards with their positions.
    pub cards: Vec<ReadingCard>,
    /// Short summary of the interpretation.
    pub summary: String,
}

impl ReadingLog {
    /// Record a reading of `cards` laid out in `spread`.
    ///
    /// Cards beyond the spread's positions are ignored.
    pub fn new(
        question: impl Into<String>,
        spread: &SpreadDefinition,
        cards: &[DrawnCard],
        summary: impl Into<String>,
    ) -> Self {
        let cards = spread
            .positions
            .iter()
            .zip(cards)
            .map(|(position, drawn)| ReadingCard {
                name: drawn.name().to_string(),
                position: position.name.to_string(),
                is_reversed: drawn.reversed,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            question: question.into(),
            spread_name: spread.name.to_string(),
            cards,
            summary: summary.into(),
        }
    }
}

/// Everything the narrator may know about the querent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationSnapshot {
    /// The stored profile, if any.
    pub profile: Option<UserProfile>,
    /// Recent readings, newest first.
    pub history: Vec<ReadingLog>,
}

impl PersonalizationSnapshot {
    /// A snapshot with no personalization at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Whether there is nothing to personalize with.
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.history.is_empty()
    }
}

macro_rules! choice_str {
    ($ty:ident, $field:literal, { $($variant:ident => [$($alias:literal),+]),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($($alias)|+ => Ok($ty::$variant),)+
                    _ => Err(CoreError::InvalidValue {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($ty::$variant => stringify!($variant),)+
                };
                f.write_str(name)
            }
        }
    };
}

choice_str!(DecisionStyle, "decision style", {
    Head => ["head", "logic"],
    Heart => ["heart", "feeling"],
    Intuition => ["intuition", "gut"],
});

choice_str!(ReadingStyle, "reading style", {
    Psychological => ["psychological", "jungian"],
    Esoteric => ["esoteric", "occult"],
    Balanced => ["balanced", "mixed"],
});

choice_str!(Verbosity, "verbosity", {
    Concise => ["concise", "short"],
    Detailed => ["detailed", "long"],
});

choice_str!(Skepticism, "skepticism", {
    Believer => ["believer"],
    Analytical => ["analytical", "skeptic"],
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::deck;
    use crate::spread::SpreadKind;

    #[test]
    fn parse_choices() {
        assert_eq!("Heart".parse::<DecisionStyle>().unwrap(), DecisionStyle::Heart);
        assert_eq!(
            "jungian".parse::<ReadingStyle>().unwrap(),
            ReadingStyle::Psychological
        );
        assert_eq!("short".parse::<Verbosity>().unwrap(), Verbosity::Concise);
        assert_eq!(
            "Analytical".parse::<Skepticism>().unwrap(),
            Skepticism::Analytical
        );
    }

    #[test]
    fn parse_choice_error_names_field() {
        let err = "sideways".parse::<DecisionStyle>().unwrap_err();
        assert_eq!(err.to_string(), "invalid decision style: \"sideways\"");
    }

    #[test]
    fn display_choices() {
        assert_eq!(ReadingStyle::Esoteric.to_string(), "Esoteric");
        assert_eq!(DecisionStyle::default().to_string(), "Intuition");
    }

    #[test]
    fn soul_profile_completeness() {
        let mut soul = SoulProfile {
            core_values: "Truth".into(),
            deepest_fear: "Stagnation".into(),
            current_goal: "Write a book".into(),
            decision_style: DecisionStyle::Head,
            struggle: String::new(),
        };
        assert!(!soul.is_complete());
        soul.struggle = "Time".into();
        assert!(soul.is_complete());
    }

    #[test]
    fn reading_log_zips_positions() {
        let spread = SpreadKind::ThreeCard.definition();
        let cards: Vec<DrawnCard> = deck().cards()[..3]
            .iter()
            .map(|card| DrawnCard {
                card,
                reversed: card.number == 1,
            })
            .collect();

        let log = ReadingLog::new("Where am I headed?", spread, &cards, "Onward.");
        assert_eq!(log.spread_name, "Past, Present, Future");
        assert_eq!(log.cards.len(), 3);
        assert_eq!(log.cards[0].position, "Past");
        assert_eq!(log.cards[1].name, "The Magician");
        assert!(log.cards[1].is_reversed);
        assert_eq!(log.summary, "Onward.");
    }

    #[test]
    fn profile_json_is_camel_case() {
        let mut profile = UserProfile::new("u1", "Mystic Traveler");
        profile.soul_profile = Some(SoulProfile::default());
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("soulProfile").is_some());
        assert!(json.get("age").is_none());
        assert!(json["soulProfile"].get("coreValues").is_some());

        let back: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn anonymous_snapshot_is_empty() {
        assert!(PersonalizationSnapshot::anonymous().is_empty());
        let snapshot = PersonalizationSnapshot {
            profile: Some(UserProfile::new("u1", "Ana")),
            history: Vec::new(),
        };
        assert!(!snapshot.is_empty());
    }
}
