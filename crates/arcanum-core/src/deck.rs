//! The fixed 78-card catalog.
//!
//! 22 major arcana (`major-0` The Fool .. `major-21` The World) followed by
//! the four minor suits in the order Wands, Cups, Swords, Pentacles, each
//! running Ace..King (`<suit>-0` .. `<suit>-13`, numbered 1..14).

use std::sync::LazyLock;

use crate::card::{CardDefinition, Suit};

/// Names of the major arcana in order.
pub const MAJOR_ARCANA_NAMES: [&str; 22] = [
    "The Fool",
    "The Magician",
    "The High Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Strength",
    "The Hermit",
    "Wheel of Fortune",
    "Justice",
    "The Hanged Man",
    "Death",
    "Temperance",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "Judgement",
    "The World",
];

const MAJOR_ARCANA_KEYWORDS: [&str; 22] = [
    "beginnings, innocence, a leap of faith",
    "will, skill, manifestation",
    "intuition, hidden knowledge, stillness",
    "abundance, nurture, creativity",
    "structure, authority, stability",
    "tradition, teaching, belonging",
    "union, choice, alignment of values",
    "determination, momentum, victory",
    "courage, patience, gentle power",
    "solitude, reflection, inner guidance",
    "cycles, fate, turning points",
    "fairness, truth, consequence",
    "surrender, pause, new perspective",
    "endings, transformation, release",
    "balance, moderation, healing",
    "attachment, shadow, temptation",
    "upheaval, revelation, sudden change",
    "hope, renewal, inspiration",
    "illusion, dreams, the unconscious",
    "joy, vitality, clarity",
    "awakening, reckoning, a calling",
    "completion, wholeness, arrival",
];

/// Rank names of the minor arcana, Ace through King.
pub const RANK_NAMES: [&str; 14] = [
    "Ace", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Page",
    "Knight", "Queen", "King",
];

const RANK_THEMES: [&str; 14] = [
    "a seed of",
    "a choice in",
    "growth in",
    "stability in",
    "struggle in",
    "harmony in",
    "a test of",
    "movement in",
    "the fullness of",
    "the culmination of",
    "curiosity about",
    "pursuit of",
    "mastery of the inner side of",
    "command of",
];

/// The full card catalog.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<CardDefinition>,
}

impl Deck {
    fn build() -> Self {
        let mut cards = Vec::with_capacity(78);

        for (index, name) in MAJOR_ARCANA_NAMES.iter().enumerate() {
            cards.push(CardDefinition {
                id: format!("major-{index}"),
                name: (*name).to_string(),
                suit: Suit::Major,
                number: index as u32,
                keywords: MAJOR_ARCANA_KEYWORDS[index].to_string(),
            });
        }

        for suit in Suit::MINOR {
            let prefix = suit.name().to_lowercase();
            for (index, rank) in RANK_NAMES.iter().enumerate() {
                cards.push(CardDefinition {
                    id: format!("{prefix}-{index}"),
                    name: format!("{rank} of {}", suit.name()),
                    suit,
                    number: index as u32 + 1,
                    keywords: format!("{} {}", RANK_THEMES[index], suit.domain()),
                });
            }
        }

        Self { cards }
    }

    /// All cards in catalog order.
    pub fn cards(&self) -> &[CardDefinition] {
        &self.cards
    }

    /// Number of cards in the deck.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the deck is empty. The built-in catalog never is.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Look up a card by id.
    pub fn get(&self, id: &str) -> Option<&CardDefinition> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// All cards of one suit, in catalog order.
    pub fn by_suit(&self, suit: Suit) -> impl Iterator<Item = &CardDefinition> {
        self.cards.iter().filter(move |c| c.suit == suit)
    }
}

static DECK: LazyLock<Deck> = LazyLock::new(Deck::build);

/// The process-wide card catalog.
pub fn deck() -> &'static Deck {
    &DECK
}
