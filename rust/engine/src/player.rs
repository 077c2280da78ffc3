use crate::cards::{envido_options, flor_points, Card};
use crate::errors::EngineError;
use serde::{Deserialize, Serialize};

/// Index of a team (`0` or `1`).
pub type TeamIdx = usize;

/// Cards dealt to each player per hand.
pub const HAND_SIZE: usize = 3;

/// A seated player and their per-hand state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identity/session token supplied by the host.
    pub id: String,
    pub seat: usize,
    pub team: TeamIdx,
    /// Cards not yet played this hand.
    hand: Vec<Card>,
    /// Cards played this hand, in order.
    used_hand: Vec<Card>,
    /// Achievable envido numbers for the dealt hand, best first.
    envido: Vec<u8>,
    flor: Option<u8>,
    pub disabled: bool,
    pub abandoned: bool,
    pub ready: bool,
    pub has_said_flor: bool,
    pub has_said_truco: bool,
    pub has_said_envido_points: bool,
}

impl Player {
    pub fn new(id: impl Into<String>, seat: usize) -> Self {
        Self {
            id: id.into(),
            seat,
            team: seat % 2,
            hand: Vec::with_capacity(HAND_SIZE),
            used_hand: Vec::with_capacity(HAND_SIZE),
            envido: Vec::new(),
            flor: None,
            disabled: false,
            abandoned: false,
            ready: false,
            has_said_flor: false,
            has_said_truco: false,
            has_said_envido_points: false,
        }
    }

    /// Takes a fresh hand and clears every per-hand flag.
    pub fn deal(&mut self, cards: Vec<Card>) {
        self.envido = envido_options(&cards);
        self.flor = flor_points(&cards);
        self.hand = cards;
        self.used_hand.clear();
        self.disabled = false;
        self.has_said_flor = false;
        self.has_said_truco = false;
        self.has_said_envido_points = false;
    }

    /// Empties the player's cards without dealing (abandoned seats).
    pub fn clear_cards(&mut self) {
        self.hand.clear();
        self.used_hand.clear();
        self.envido.clear();
        self.flor = None;
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn used_hand(&self) -> &[Card] {
        &self.used_hand
    }

    /// Dealt cards, played or not.
    pub fn dealt(&self) -> Vec<Card> {
        self.used_hand.iter().chain(&self.hand).copied().collect()
    }

    pub fn envido_options(&self) -> &[u8] {
        &self.envido
    }

    pub fn envido_points(&self) -> u8 {
        self.envido.first().copied().unwrap_or(0)
    }

    pub fn has_flor(&self) -> bool {
        self.flor.is_some()
    }

    pub fn flor_points(&self) -> Option<u8> {
        self.flor
    }

    pub fn is_active(&self) -> bool {
        !self.disabled && !self.abandoned
    }

    /// Moves the card at `index` to the played pile, checking that it is the
    /// card the caller expects.
    /// Errors unless `card` sits at `index` of the hand.
    pub fn check_card(&self, index: usize, card: Card) -> Result<(), EngineError> {
        match self.hand.get(index) {
            Some(&c) if c == card => Ok(()),
            _ => Err(EngineError::CardMismatch {
                seat: self.seat,
                index,
                card: card.to_string(),
            }),
        }
    }

    pub fn take_card(&mut self, index: usize, card: Card) -> Result<Card, EngineError> {
        self.check_card(index, card)?;
        self.hand.remove(index);
        self.used_hand.push(card);
        Ok(card)
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn abandon(&mut self) {
        self.abandoned = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(codes: &[&str]) -> Vec<Card> {
        codes.iter().map(|c| c.parse().unwrap()).collect()
    }

    #[test]
    fn seat_parity_decides_team() {
        assert_eq!(Player::new("a", 0).team, 0);
        assert_eq!(Player::new("b", 3).team, 1);
    }

    #[test]
    fn deal_computes_envido_and_flor() {
        let mut p = Player::new("a", 0);
        p.deal(cards(&["7e", "6e", "5e"]));
        assert!(p.has_flor());
        assert_eq!(p.flor_points(), Some(38));
        assert_eq!(p.envido_points(), 33);
    }

    #[test]
    fn take_card_checks_index_and_value() {
        let mut p = Player::new("a", 0);
        p.deal(cards(&["1e", "4c", "12o"]));
        let four: Card = "4c".parse().unwrap();
        assert!(p.take_card(0, four).is_err());
        assert_eq!(p.hand().len(), 3);
        assert_eq!(p.take_card(1, four).unwrap(), four);
        assert_eq!(p.hand().len(), 2);
        assert_eq!(p.used_hand(), &[four]);
        assert_eq!(p.dealt().len(), 3);
    }

    #[test]
    fn deal_resets_disabled_but_not_abandoned() {
        let mut p = Player::new("a", 0);
        p.disable();
        p.abandon();
        p.deal(cards(&["1e", "4c", "12o"]));
        assert!(!p.disabled);
        assert!(p.abandoned);
        assert!(!p.is_active());
    }
}
