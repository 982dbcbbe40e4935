//! Shuffle and reversal engine.
//!
//! The whole deck is shuffled up front. Draws are sequential pops from the
//! result and nothing is re-shuffled mid-session, so the undrawn remainder
//! is always a legitimate deck.

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::card::DrawnCard;
use crate::deck::Deck;

/// Probability that any single card comes up reversed.
pub const DEFAULT_REVERSAL_CHANCE: f64 = 0.2;

/// Produce a uniformly random permutation of `deck`, each card independently
/// marked reversed with probability `reversal_chance` (clamped to 0..=1).
///
/// Orientation is drawn after the permutation, so it is uncorrelated with
/// position.
pub fn shuffle_deck(deck: &'static Deck, reversal_chance: f64, rng: &mut StdRng) -> Vec<DrawnCard> {
    let p = if reversal_chance.is_nan() {
        0.0
    } else {
        reversal_chance.clamp(0.0, 1.0)
    };

    let mut order: Vec<_> = deck.cards().iter().collect();
    order.shuffle(rng);

    order
        .into_iter()
        .map(|card| DrawnCard {
            card,
            reversed: rng.random_bool(p),
        })
        .collect()
}
