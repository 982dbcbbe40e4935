//! Card identity and orientation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The five card groups of the deck: four minor suits plus the major arcana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    /// Fire, will, ambition.
    Wands,
    /// Water, feeling, relationships.
    Cups,
    /// Air, thought, conflict.
    Swords,
    /// Earth, work, the material world.
    Pentacles,
    /// The 22 trump cards; no suit grouping.
    Major,
}

impl Suit {
    /// The four minor suits in catalog order.
    pub const MINOR: [Suit; 4] = [Suit::Wands, Suit::Cups, Suit::Swords, Suit::Pentacles];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Suit::Wands => "Wands",
            Suit::Cups => "Cups",
            Suit::Swords => "Swords",
            Suit::Pentacles => "Pentacles",
            Suit::Major => "Major Arcana",
        }
    }

    /// Whether this is the major arcana marker.
    pub fn is_major(self) -> bool {
        self == Suit::Major
    }

    /// The slice of life a minor suit speaks to.
    pub(crate) fn domain(self) -> &'static str {
        match self {
            Suit::Wands => "drive and creative fire",
            Suit::Cups => "emotion and connection",
            Suit::Swords => "thought and conflict",
            Suit::Pentacles => "work, money and the body",
            Suit::Major => "the soul's journey",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Suit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wands" => Ok(Suit::Wands),
            "cups" => Ok(Suit::Cups),
            "swords" => Ok(Suit::Swords),
            "pentacles" => Ok(Suit::Pentacles),
            "major" | "major arcana" | "trumps" => Ok(Suit::Major),
            _ => Err(CoreError::UnknownSuit(s.to_string())),
        }
    }
}

/// An immutable card in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Stable identifier, e.g. `major-0` or `cups-13`.
    pub id: String,
    /// Display name, e.g. "The Fool" or "King of Cups".
    pub name: String,
    /// Suit, or [`Suit::Major`].
    pub suit: Suit,
    /// 0 for The Fool, 0..=21 for the major arcana, 1..=14 for minor ranks.
    /// Used for display numbering only.
    pub number: u32,
    /// Brief keyword description.
    pub keywords: String,
}

impl fmt::Display for CardDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A catalog card dealt into a session, with its orientation fixed at
/// shuffle time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawnCard {
    /// The catalog entry.
    pub card: &'static CardDefinition,
    /// Whether the card came up reversed.
    pub reversed: bool,
}

impl DrawnCard {
    /// The card's stable id.
    pub fn id(&self) -> &'static str {
        &self.card.id
    }

    /// The card's display name.
    pub fn name(&self) -> &'static str {
        &self.card.name
    }

    /// "Upright" or "Reversed".
    pub fn orientation(&self) -> &'static str {
        if self.reversed { "Reversed" } else { "Upright" }
    }
}

impl fmt::Display for DrawnCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reversed {
            write!(f, "{} (reversed)", self.card.name)
        } else {
            f.write_str(&self.card.name)
        }
    }
}
