//! # truco-engine: Truco Game Engine Core
//!
//! Rules engine for Argentine Truco with the Envido and Flor sub-games, for
//! two teams of one to three players. Hands are driven as a pump: the host
//! calls [`game::Match::play`] (or runs a [`game_loop::GameLoop`]) and submits
//! actions against the returned decision id. Shuffles use commit-reveal
//! randomness so every deal can be verified after the match.
//!
//! ## Core Modules
//!
//! - [`cards`] - Spanish deck, truco strength and envido/flor values
//! - [`deck`] - Verifiable Fisher-Yates shuffle
//! - [`random`] - Commit-reveal seeds and per-hand entropy
//! - [`player`], [`team`], [`table`] - Seating, per-hand flags and scores
//! - [`round`], [`turn`] - Tricks and turn order
//! - [`truco`], [`envido`], [`flor`] - The three betting sub-games
//! - [`rules`] - Legal commands and hand-winner rule
//! - [`hand`] - One hand's state machine
//! - [`game`] - Match lifecycle and scoring
//! - [`game_loop`] - Async driver over a decision handler
//! - [`logger`] - HandRecord JSONL serialization
//! - [`errors`] - Error types
//!
//! ## Quick Start
//!
//! ```rust
//! use truco_engine::game::{Match, MatchStep};
//! use truco_engine::options::MatchOptions;
//! use truco_engine::random::{HashChain, Random};
//! use truco_engine::table::Table;
//!
//! let table = Table::new(vec!["ana"], vec!["beto"]).unwrap();
//! let mut game = Match::new(
//!     table,
//!     MatchOptions::default(),
//!     Random::from_seed(7, 2),
//!     Box::new(HashChain::new(7)),
//! )
//! .unwrap();
//!
//! match game.play().unwrap() {
//!     MatchStep::Decision(play) => {
//!         // The forehand decides first.
//!         assert_eq!(play.seat, 0);
//!         assert!(!play.legal_actions().is_empty());
//!     }
//!     other => panic!("unexpected step: {:?}", other),
//! }
//! ```
//!
//! ## Envido values
//!
//! ```rust
//! use truco_engine::cards::{envido_points, flor_points, Card};
//!
//! let hand: Vec<Card> = ["7e", "6e", "1c"].iter().map(|c| c.parse().unwrap()).collect();
//! assert_eq!(envido_points(&hand), 33);
//! assert_eq!(flor_points(&hand), None);
//! ```

pub mod cards;
pub mod commands;
pub mod deck;
pub mod envido;
pub mod errors;
pub mod flor;
pub mod game;
pub mod game_loop;
pub mod hand;
pub mod logger;
pub mod options;
pub mod player;
pub mod random;
pub mod round;
pub mod rules;
pub mod table;
pub mod team;
pub mod truco;
pub mod turn;
