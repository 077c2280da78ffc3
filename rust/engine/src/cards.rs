use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four suits of the Spanish deck.
/// Each suit has a one-letter code used by [`Card`]'s compact notation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Suit {
    /// Espadas (`e`)
    Swords,
    /// Bastos (`b`)
    Clubs,
    /// Oros (`o`)
    Golds,
    /// Copas (`c`)
    Cups,
}

impl Suit {
    pub fn code(self) -> char {
        match self {
            Suit::Swords => 'e',
            Suit::Clubs => 'b',
            Suit::Golds => 'o',
            Suit::Cups => 'c',
        }
    }

    pub fn from_code(c: char) -> Option<Suit> {
        match c {
            'e' => Some(Suit::Swords),
            'b' => Some(Suit::Clubs),
            'o' => Some(Suit::Golds),
            'c' => Some(Suit::Cups),
            _ => None,
        }
    }
}

/// Face value of a card. Eights and nines are not part of the deck.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    /// Sota (10)
    Jack = 10,
    /// Caballo (11)
    Horse = 11,
    /// Rey (12)
    King = 12,
}

impl Rank {
    pub fn from_u8(v: u8) -> Option<Rank> {
        match v {
            1 => Some(Rank::One),
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            10 => Some(Rank::Jack),
            11 => Some(Rank::Horse),
            12 => Some(Rank::King),
            _ => None,
        }
    }

    /// Contribution of this rank to envido and flor sums. Figures count zero.
    pub fn envido_value(self) -> u8 {
        match self {
            Rank::Jack | Rank::Horse | Rank::King => 0,
            r => r as u8,
        }
    }
}

/// A single card of the 40-card deck.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

/// Strength of the best card in the deck (ace of swords).
pub const MAX_STRENGTH: u8 = 13;

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Trick-taking strength: 13 is the ace of swords, 0 the fours.
    pub fn strength(&self) -> u8 {
        use Rank::*;
        use Suit::*;
        match (self.rank, self.suit) {
            (One, Swords) => 13,
            (One, Clubs) => 12,
            (Seven, Swords) => 11,
            (Seven, Golds) => 10,
            (Three, _) => 9,
            (Two, _) => 8,
            (One, _) => 7,
            (King, _) => 6,
            (Horse, _) => 5,
            (Jack, _) => 4,
            (Seven, _) => 3,
            (Six, _) => 2,
            (Five, _) => 1,
            (Four, _) => 0,
        }
    }

    pub fn envido_value(&self) -> u8 {
        self.rank.envido_value()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank as u8, self.suit.code())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid card code: {0:?}")]
pub struct CardParseError(pub String);

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || CardParseError(s.to_string());
        let suit_char = s.chars().last().ok_or_else(err)?;
        let suit = Suit::from_code(suit_char.to_ascii_lowercase()).ok_or_else(err)?;
        let rank: u8 = s[..s.len() - suit_char.len_utf8()]
            .parse()
            .map_err(|_| err())?;
        let rank = Rank::from_u8(rank).ok_or_else(err)?;
        Ok(Card::new(rank, suit))
    }
}

/// A card as it lies on the table: either shown or played face-down.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PlayedCard {
    Face(Card),
    /// Played hidden; it never wins and never ties a trick.
    Burnt,
}

impl PlayedCard {
    pub fn strength(&self) -> Option<u8> {
        match self {
            PlayedCard::Face(c) => Some(c.strength()),
            PlayedCard::Burnt => None,
        }
    }

    pub fn card(&self) -> Option<Card> {
        match self {
            PlayedCard::Face(c) => Some(*c),
            PlayedCard::Burnt => None,
        }
    }
}

impl fmt::Display for PlayedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayedCard::Face(c) => c.fmt(f),
            PlayedCard::Burnt => f.write_str("xx"),
        }
    }
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Swords, Suit::Clubs, Suit::Golds, Suit::Cups]
}

pub fn all_ranks() -> [Rank; 10] {
    [
        Rank::One,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Jack,
        Rank::Horse,
        Rank::King,
    ]
}

pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(40);
    for &s in &all_suits() {
        for &r in &all_ranks() {
            v.push(Card::new(r, s));
        }
    }
    v
}

/// Every envido number a hand can legitimately declare, best first.
///
/// A same-suit pair scores 20 plus both envido values; a lone card scores its
/// own value. Declaring a lower achievable number is allowed, so all of them
/// are returned.
pub fn envido_options(cards: &[Card]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, a) in cards.iter().enumerate() {
        out.push(a.envido_value());
        for b in &cards[i + 1..] {
            if a.suit == b.suit {
                out.push(20 + a.envido_value() + b.envido_value());
            }
        }
    }
    out.sort_unstable_by(|a, b| b.cmp(a));
    out.dedup();
    out
}

pub fn envido_points(cards: &[Card]) -> u8 {
    envido_options(cards).first().copied().unwrap_or(0)
}

/// Three cards of the same suit.
pub fn is_flor(cards: &[Card]) -> bool {
    cards.len() == 3 && cards.iter().all(|c| c.suit == cards[0].suit)
}

/// Flor value (20 plus the three envido values), if the hand is a flor.
pub fn flor_points(cards: &[Card]) -> Option<u8> {
    if is_flor(cards) {
        Some(20 + cards.iter().map(Card::envido_value).sum::<u8>())
    } else {
        None
    }
}
