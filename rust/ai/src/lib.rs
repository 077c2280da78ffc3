//! # truco-ai: Bots for the Truco engine
//!
//! Pluggable strategies that answer engine decision points. A strategy only
//! sees the [`PlayInstance`] snapshot of the seat it plays for, so it cannot
//! peek at hidden cards.
//!
//! ## Core Components
//!
//! - [`BotStrategy`] - Trait for choosing an action at a decision point
//! - [`baseline`] - Rule-based bot with envido/flor thresholds
//! - [`random`] - Uniform choice over legal actions
//! - [`table`] - [`BotTable`], a decision handler seating one bot per seat
//! - [`create_bot`] - Factory by name
//!
//! ## Quick Start
//!
//! ```rust
//! use truco_ai::create_bot;
//! use truco_engine::game::{Match, MatchStep};
//! use truco_engine::options::MatchOptions;
//! use truco_engine::random::{HashChain, Random};
//! use truco_engine::table::Table;
//!
//! let mut bot = create_bot("baseline", 0).unwrap();
//! let table = Table::new(vec!["bot"], vec!["human"]).unwrap();
//! let mut game = Match::new(
//!     table,
//!     MatchOptions::default(),
//!     Random::from_seed(42, 2),
//!     Box::new(HashChain::new(42)),
//! )
//! .unwrap();
//!
//! if let MatchStep::Decision(play) = game.play().unwrap() {
//!     let action = bot.decide(&play);
//!     assert!(play.legal_actions().contains(&action));
//!     game.act(play.decision_id, action).unwrap();
//! }
//! ```
//!
//! ## Bot Names
//!
//! - `"baseline"` - [`BaselineBot`]
//! - `"random"` - [`RandomBot`]

use thiserror::Error;
use truco_engine::commands::{Action, Command};
use truco_engine::hand::PlayInstance;

pub mod baseline;
pub mod random;
pub mod table;

pub use baseline::BaselineBot;
pub use random::RandomBot;
pub use table::BotTable;

/// Chooses an action for the seat a [`PlayInstance`] belongs to.
///
/// Implementations must return one of `play.legal_actions()`; anything else
/// is rejected by the engine and the decision is offered again.
///
/// # Example Implementation
///
/// ```rust
/// use truco_ai::BotStrategy;
/// use truco_engine::commands::Action;
/// use truco_engine::hand::PlayInstance;
///
/// struct FirstLegal;
///
/// impl BotStrategy for FirstLegal {
///     fn decide(&mut self, play: &PlayInstance) -> Action {
///         play.legal_actions()[0]
///     }
///
///     fn name(&self) -> &str {
///         "FirstLegal"
///     }
/// }
/// ```
pub trait BotStrategy: Send {
    fn decide(&mut self, play: &PlayInstance) -> Action;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bot: {0} (expected baseline or random)")]
pub struct UnknownBot(pub String);

/// Creates a bot by name. `seed` only matters for bots that draw randomness.
///
/// ```rust
/// use truco_ai::create_bot;
///
/// assert_eq!(create_bot("baseline", 0).unwrap().name(), "BaselineBot");
/// assert!(create_bot("oracle", 0).is_err());
/// ```
pub fn create_bot(name: &str, seed: u64) -> Result<Box<dyn BotStrategy>, UnknownBot> {
    match name {
        "baseline" => Ok(Box::new(BaselineBot::new())),
        "random" => Ok(Box::new(RandomBot::new(seed))),
        other => Err(UnknownBot(other.to_string())),
    }
}

/// Last resort when a snapshot offers nothing the bot recognizes.
pub(crate) fn fallback(play: &PlayInstance) -> Action {
    play.legal_actions()
        .first()
        .copied()
        .unwrap_or_else(|| Action::say(play.seat, Command::MeVoyAlMazo))
}
