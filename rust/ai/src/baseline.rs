//! Rule-based bot for Truco.
//!
//! Bets on fixed envido and flor thresholds and plays cards with a simple
//! trick-aware rule: win the trick as cheaply as possible, or throw the
//! weakest card when it cannot be won or is already won by a partner.

use truco_engine::cards::{Card, envido_points, flor_points};
use truco_engine::commands::{Action, Command, Say};
use truco_engine::hand::{HandState, PlayInstance};

use crate::{BotStrategy, fallback};

/// Strength from which a card counts as a trick winner (threes and up).
const STRONG_CARD: u8 = 9;

/// Deterministic rule-based bot.
///
/// # Strategy
///
/// **Envido:** opens with 28 or more, raises to real envido with 31 or more,
/// accepts from 27. Concedes with "son buenas" when the leading declaration
/// beats its own points.
///
/// **Flor:** always declares; answers a flor with quiero from 30,
/// contraflor from 35.
///
/// **Truco:** calls or accepts with two strong cards, or with one strong
/// card after winning a trick.
///
/// # Example
///
/// ```rust
/// use truco_ai::{BaselineBot, BotStrategy};
///
/// let bot = BaselineBot::new();
/// assert_eq!(bot.name(), "BaselineBot");
/// ```
#[derive(Debug, Clone, Default)]
pub struct BaselineBot;

impl BaselineBot {
    pub fn new() -> Self {
        Self
    }

    fn say(play: &PlayInstance, command: Command) -> Option<Action> {
        play.can_say(command)
            .then(|| Action::say(play.seat, command))
    }

    fn answer(play: &PlayInstance, accept: bool) -> Option<Action> {
        if accept {
            Self::say(play, Command::Quiero)
        } else {
            Self::say(play, Command::NoQuiero)
        }
    }

    /// Number of strong cards left, counting a won trick as one more.
    fn truco_strength(play: &PlayInstance) -> usize {
        let strong = play
            .cards
            .iter()
            .filter(|c| c.strength() >= STRONG_CARD)
            .count();
        let won = play
            .tricks
            .iter()
            .filter(|t| **t == Some(play.team))
            .count();
        strong + won
    }

    fn flor_answer(play: &PlayInstance) -> Option<Action> {
        if let Some(a) = Self::say(play, Command::Flor) {
            return Some(a);
        }
        let points = flor_points(&play.cards).unwrap_or(0);
        if points >= 35 {
            if let Some(a) = Self::say(play, Command::Contraflor) {
                return Some(a);
            }
        }
        Self::answer(play, points >= 30)
    }

    fn envido_answer(play: &PlayInstance) -> Option<Action> {
        if let Some(a) = Self::say(play, Command::Flor) {
            return Some(a);
        }
        let points = envido_points(&play.cards);
        if points >= 31 {
            if let Some(a) = Self::say(play, Command::RealEnvido) {
                return Some(a);
            }
        }
        Self::answer(play, points >= 27)
    }

    fn envido_points_answer(play: &PlayInstance) -> Option<Action> {
        let best = play.envido_options.first().copied()?;
        let beaten = play
            .envido_leader
            .as_ref()
            .filter(|l| l.team != play.team)
            .and_then(|l| l.points)
            .is_some_and(|p| p >= best);
        if beaten {
            if let Some(a) = Self::say(play, Command::SonBuenas) {
                return Some(a);
            }
        }
        Some(Action::say(play.seat, Say::Points(best)))
    }

    fn truco_answer(play: &PlayInstance) -> Option<Action> {
        if let Some(a) = Self::say(play, Command::Flor) {
            return Some(a);
        }
        let strength = Self::truco_strength(play);
        if strength >= 3 {
            for raise in [Command::ReTruco, Command::ValeCuatro] {
                if let Some(a) = Self::say(play, raise) {
                    return Some(a);
                }
            }
        }
        Self::answer(play, strength >= 2)
    }

    fn turn(play: &PlayInstance) -> Option<Action> {
        if let Some(a) = Self::say(play, Command::Flor) {
            return Some(a);
        }
        if play.tricks.is_empty() && play.can_say(Command::Envido) {
            let points = envido_points(&play.cards);
            if points >= 31 {
                return Self::say(play, Command::RealEnvido);
            }
            if points >= 28 {
                return Self::say(play, Command::Envido);
            }
        }
        if Self::truco_strength(play) >= 2 {
            for call in [Command::Truco, Command::ReTruco, Command::ValeCuatro] {
                if let Some(a) = Self::say(play, call) {
                    return Some(a);
                }
            }
        }
        if play.can_play {
            return Self::choose_card(play);
        }
        None
    }

    /// Cheapest winning card, or the weakest card when the trick is lost or
    /// already held by the team.
    fn choose_card(play: &PlayInstance) -> Option<Action> {
        let mut by_strength: Vec<(usize, Card)> = play.cards.iter().copied().enumerate().collect();
        by_strength.sort_by_key(|(_, c)| c.strength());
        let (weakest, strongest) = (by_strength.first()?, by_strength.last()?);

        let best = |own: bool| {
            play.trick
                .iter()
                .filter(|p| (p.team == play.team) == own)
                .filter_map(|p| p.card.strength())
                .max()
        };
        let pick = match (best(false), best(true)) {
            (None, _) => {
                // Leading: keep the strong card once a trick is in hand.
                if play.tricks.contains(&Some(play.team)) {
                    weakest
                } else {
                    strongest
                }
            }
            (Some(theirs), ours) if ours.is_some_and(|o| o > theirs) => weakest,
            (Some(_), _) if play.unbeatable => weakest,
            (Some(theirs), _) => by_strength
                .iter()
                .find(|(_, c)| c.strength() > theirs)
                .unwrap_or(weakest),
        };
        Some(Action::play(play.seat, pick.0, pick.1))
    }
}

impl BotStrategy for BaselineBot {
    fn decide(&mut self, play: &PlayInstance) -> Action {
        let choice = match play.state {
            HandState::WaitingFlorAnswer => Self::flor_answer(play),
            HandState::WaitingEnvidoAnswer => Self::envido_answer(play),
            HandState::WaitingEnvidoPointsAnswer => Self::envido_points_answer(play),
            HandState::WaitingForTrucoAnswer => Self::truco_answer(play),
            _ => Self::turn(play),
        };
        choice.unwrap_or_else(|| fallback(play))
    }

    fn name(&self) -> &str {
        "BaselineBot"
    }
}
