use serde::{Deserialize, Serialize};

use crate::cards::{full_deck, Card};
use crate::random::{decode_secret, draw, FairnessError, Random, Reveal};

/// Everything needed to replay one hand's shuffle after the reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleProof {
    pub commitment: String,
    pub block_hash: String,
    /// Seat whose client seed drove the draws (the hand's forehand).
    pub seat: usize,
    pub start_nonce: u64,
}

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    random: Random,
}

impl Deck {
    pub fn new(random: Random) -> Self {
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            position: 0,
            random,
        }
    }

    /// Resets to a full deck and Fisher-Yates shuffles it with draws bound to
    /// `block_hash` and the forehand `seat`.
    pub fn shuffle(&mut self, seat: usize, block_hash: &str) -> Result<ShuffleProof, FairnessError> {
        self.random.bind_block_hash(block_hash);
        let proof = ShuffleProof {
            commitment: self.random.commitment(),
            block_hash: block_hash.to_string(),
            seat,
            start_nonce: self.random.nonce(),
        };
        self.cards = full_deck();
        for i in (1..self.cards.len()).rev() {
            let j = self.random.pick(seat, i + 1)?;
            self.cards.swap(i, j);
        }
        self.position = 0;
        Ok(proof)
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        let c = self.cards.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }

    pub fn random(&self) -> &Random {
        &self.random
    }

    pub fn random_mut(&mut self) -> &mut Random {
        &mut self.random
    }
}

/// Recomputes the shuffled order of a hand from revealed data.
pub fn verify_shuffle(reveal: &Reveal, proof: &ShuffleProof) -> Result<Vec<Card>, FairnessError> {
    let secret = decode_secret(reveal, &proof.commitment)?;
    let client_seed = reveal
        .client_seeds
        .get(proof.seat)
        .ok_or(FairnessError::UnknownSeat(proof.seat))?;
    let mut cards = full_deck();
    let mut nonce = proof.start_nonce;
    for i in (1..cards.len()).rev() {
        let j = draw(&secret, client_seed, &proof.block_hash, nonce, i + 1);
        nonce += 1;
        cards.swap(i, j);
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn shuffle_keeps_forty_distinct_cards() {
        let mut deck = Deck::new(Random::from_seed(42, 4));
        deck.shuffle(0, "hash-1").unwrap();
        let mut set = HashSet::new();
        while let Some(c) = deck.deal_card() {
            assert!(set.insert(c), "card {} duplicated", c);
        }
        assert_eq!(set.len(), 40);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn block_hash_changes_the_order() {
        let mut a = Deck::new(Random::from_seed(42, 2));
        let mut b = Deck::new(Random::from_seed(42, 2));
        a.shuffle(0, "hash-a").unwrap();
        b.shuffle(0, "hash-b").unwrap();
        let xs: Vec<Card> = (0..10).filter_map(|_| a.deal_card()).collect();
        let ys: Vec<Card> = (0..10).filter_map(|_| b.deal_card()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn nonce_keeps_growing_across_hands() {
        let mut deck = Deck::new(Random::from_seed(5, 2));
        let p1 = deck.shuffle(0, "h1").unwrap();
        let p2 = deck.shuffle(1, "h2").unwrap();
        assert_eq!(p1.start_nonce, 0);
        assert_eq!(p2.start_nonce, 39);
    }

    #[test]
    fn reveal_reproduces_each_shuffle() {
        let mut deck = Deck::new(Random::from_seed(99, 2));
        deck.random_mut().set_client_seed(0, "alice").unwrap();
        deck.random_mut().set_client_seed(1, "bob").unwrap();
        let mut proofs = Vec::new();
        let mut orders = Vec::new();
        for (seat, hash) in [(0, "b1"), (1, "b2"), (0, "b3")] {
            proofs.push(deck.shuffle(seat, hash).unwrap());
            orders.push((0..40).filter_map(|_| deck.deal_card()).collect::<Vec<_>>());
        }
        let reveal = deck.random().reveal();
        for (proof, order) in proofs.iter().zip(orders) {
            assert_eq!(verify_shuffle(&reveal, proof).unwrap(), order);
        }
    }
}
