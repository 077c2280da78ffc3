use thiserror::Error;

use crate::commands::Command;
use crate::random::FairnessError;

/// Errors raised by the engine.
///
/// Rejections (`IllegalAction`, `NotPlayersTurn`, `CardMismatch`,
/// `StaleDecision`) never mutate state: the same decision point stays open.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Command {command} is not legal for seat {seat} right now")]
    IllegalAction { seat: usize, command: Command },
    #[error("Seat {seat} cannot play a card right now")]
    IllegalPlay { seat: usize },
    #[error("It's not seat {actual}'s turn (expected seat {expected})")]
    NotPlayersTurn { expected: usize, actual: usize },
    #[error("Card {card} is not at index {index} of seat {seat}'s hand")]
    CardMismatch {
        seat: usize,
        index: usize,
        card: String,
    },
    #[error("Envido points {points} are not available to seat {seat}")]
    InvalidEnvidoPoints { seat: usize, points: u8 },
    #[error("Decision {given} is no longer open (current: {current:?})")]
    StaleDecision { given: u64, current: Option<u64> },
    #[error("No hand in progress")]
    NoActiveHand,
    #[error("Match already finished")]
    MatchFinished,
    #[error("Unknown seat {0}")]
    UnknownSeat(usize),
    #[error("Envido points can only be declared after the envido was accepted")]
    EnvidoNotAccepted,
    #[error("Seat {0} does not hold a flor")]
    NoFlor(usize),
    #[error("Invalid team sizes: {0} vs {1} (expected 1, 2 or 3 players per team)")]
    InvalidTeamSizes(usize, usize),
    #[error("Deck exhausted")]
    DeckExhausted,
    #[error(transparent)]
    Fairness(#[from] FairnessError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Invalid match configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("match_point must be between 1 and 30, got {0}")]
    MatchPoint(u8),
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("handler retry attempts must be at most 10, got {0}")]
    RetryAttempts(u8),
}
