//! Spread definitions: named, ordered sets of card positions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A slot in a spread, with the meaning the card placed there answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpreadPosition {
    /// Position name, e.g. "Past".
    pub name: &'static str,
    /// What a card in this position speaks to.
    pub description: &'static str,
}

/// A static catalog entry describing one spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpreadDefinition {
    /// Catalog key.
    pub kind: SpreadKind,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Positions in draw order. The length is the number of cards required.
    pub positions: &'static [SpreadPosition],
}

impl SpreadDefinition {
    /// Number of cards this spread requires.
    pub fn card_count(&self) -> usize {
        self.positions.len()
    }
}

/// Identifies a spread in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpreadKind {
    /// One card.
    #[default]
    Single,
    /// Past, present, future.
    ThreeCard,
    /// Simplified five-card Celtic Cross.
    CelticCross,
    /// Two options weighed against a dilemma.
    Decision,
}

impl SpreadKind {
    /// Every spread, in menu order.
    pub const ALL: [SpreadKind; 4] = [
        SpreadKind::Single,
        SpreadKind::ThreeCard,
        SpreadKind::Decision,
        SpreadKind::CelticCross,
    ];

    /// Stable identifier used on the command line and in stored data.
    pub fn id(self) -> &'static str {
        match self {
            SpreadKind::Single => "single",
            SpreadKind::ThreeCard => "three-card",
            SpreadKind::CelticCross => "celtic-cross",
            SpreadKind::Decision => "decision",
        }
    }

    /// Short label, e.g. "Past, Present, Future".
    pub fn label(self) -> &'static str {
        match self {
            SpreadKind::Single => "Single Card",
            SpreadKind::ThreeCard => "Past, Present, Future",
            SpreadKind::CelticCross => "Celtic Cross",
            SpreadKind::Decision => "Decision Making",
        }
    }

    /// The catalog entry for this spread.
    pub fn definition(self) -> &'static SpreadDefinition {
        match self {
            SpreadKind::Single => &SINGLE,
            SpreadKind::ThreeCard => &THREE_CARD,
            SpreadKind::CelticCross => &CELTIC_CROSS,
            SpreadKind::Decision => &DECISION,
        }
    }
}

impl fmt::Display for SpreadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SpreadKind {
    type Err = CoreError;

    /// Accepts the stable id or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        SpreadKind::ALL
            .into_iter()
            .find(|k| k.id() == needle || k.label().to_lowercase() == needle)
            .ok_or_else(|| CoreError::UnknownSpread(s.to_string()))
    }
}

static SINGLE: SpreadDefinition = SpreadDefinition {
    kind: SpreadKind::Single,
    name: "Single Card Draw",
    description: "A quick answer to a specific question or a daily theme.",
    positions: &[SpreadPosition {
        name: "The Answer",
        description: "Insight into the situation.",
    }],
};

static THREE_CARD: SpreadDefinition = SpreadDefinition {
    kind: SpreadKind::ThreeCard,
    name: "Past, Present, Future",
    description: "Understand the temporal flow of your situation.",
    positions: &[
        SpreadPosition {
            name: "Past",
            description: "Influences from the past.",
        },
        SpreadPosition {
            name: "Present",
            description: "Current situation.",
        },
        SpreadPosition {
            name: "Future",
            description: "Likely outcome.",
        },
    ],
};

static DECISION: SpreadDefinition = SpreadDefinition {
    kind: SpreadKind::Decision,
    name: "Decision Making",
    description: "Weighing two options.",
    positions: &[
        SpreadPosition {
            name: "The Dilemma",
            description: "The nature of the choice.",
        },
        SpreadPosition {
            name: "Option A",
            description: "What happens if you choose A.",
        },
        SpreadPosition {
            name: "Option B",
            description: "What happens if you choose B.",
        },
    ],
};

static CELTIC_CROSS: SpreadDefinition = SpreadDefinition {
    kind: SpreadKind::CelticCross,
    name: "Celtic Cross (Simplified)",
    description: "Deep dive into a complex situation. (5 Cards version for speed)",
    positions: &[
        SpreadPosition {
            name: "The Heart",
            description: "Central issue.",
        },
        SpreadPosition {
            name: "The Cross",
            description: "Challenge or obstacle.",
        },
        SpreadPosition {
            name: "The Foundation",
            description: "Subconscious influences.",
        },
        SpreadPosition {
            name: "The Crown",
            description: "Goals and ideals.",
        },
        SpreadPosition {
            name: "The Outcome",
            description: "Final trajectory.",
        },
    ],
};
