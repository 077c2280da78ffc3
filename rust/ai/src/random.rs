//! Uniformly random bot, useful for fuzzing the engine.

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha20Rng;
use truco_engine::commands::Action;
use truco_engine::hand::PlayInstance;

use crate::{BotStrategy, fallback};

/// Picks any legal action with equal probability. Seeded, so a simulation
/// with the same seed replays the same choices.
#[derive(Debug, Clone)]
pub struct RandomBot {
    rng: ChaCha20Rng,
}

impl RandomBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl BotStrategy for RandomBot {
    fn decide(&mut self, play: &PlayInstance) -> Action {
        let actions = play.legal_actions();
        match actions.choose(&mut self.rng) {
            Some(a) => *a,
            None => fallback(play),
        }
    }

    fn name(&self) -> &str {
        "RandomBot"
    }
}
