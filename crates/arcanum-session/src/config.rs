//! Configuration for a reading session.

use std::time::Duration;

use arcanum_core::DEFAULT_REVERSAL_CHANCE;

/// Tuning for a reading session.
///
/// The delays exist so a renderer can play its animations. None of them is
/// load-bearing for correctness, and [`SessionConfig::instant`] zeroes them.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed for reproducible shuffles.
    pub seed: u64,
    /// Probability that a card is dealt reversed.
    pub reversal_chance: f64,
    /// How long Shuffling lasts before Drawing begins.
    pub shuffle_delay: Duration,
    /// Pause after the final draw before Revealing begins.
    pub final_draw_delay: Duration,
    /// Delay after entering Revealing before the cards flip face up.
    pub reveal_flip_delay: Duration,
    /// How long Revealing lasts before the reading is requested.
    pub reading_delay: Duration,
    /// How many past readings to hand to the narrator.
    pub history_limit: usize,
    /// Upper bound on any single profile-store call.
    pub store_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            reversal_chance: DEFAULT_REVERSAL_CHANCE,
            shuffle_delay: Duration::from_millis(2500),
            final_draw_delay: Duration::from_millis(800),
            reveal_flip_delay: Duration::from_millis(100),
            reading_delay: Duration::from_millis(2000),
            history_limit: 5,
            store_timeout: Duration::from_secs(3),
        }
    }
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the reversal probability (clamped to 0.0-1.0).
    pub fn with_reversal_chance(mut self, chance: f64) -> Self {
        self.reversal_chance = if chance.is_nan() {
            0.0
        } else {
            chance.clamp(0.0, 1.0)
        };
        self
    }

    /// Set the Shuffling duration.
    pub fn with_shuffle_delay(mut self, delay: Duration) -> Self {
        self.shuffle_delay = delay;
        self
    }

    /// Set the pause after the final draw.
    pub fn with_final_draw_delay(mut self, delay: Duration) -> Self {
        self.final_draw_delay = delay;
        self
    }

    /// Set the delay before cards flip face up.
    pub fn with_reveal_flip_delay(mut self, delay: Duration) -> Self {
        self.reveal_flip_delay = delay;
        self
    }

    /// Set the Revealing duration.
    pub fn with_reading_delay(mut self, delay: Duration) -> Self {
        self.reading_delay = delay;
        self
    }

    /// Set how many past readings the narrator sees.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the profile-store timeout.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Zero every presentation delay.
    pub fn instant(self) -> Self {
        self.with_shuffle_delay(Duration::ZERO)
            .with_final_draw_delay(Duration::ZERO)
            .with_reveal_flip_delay(Duration::ZERO)
            .with_reading_delay(Duration::ZERO)
    }
}
