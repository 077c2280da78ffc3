use serde::{Deserialize, Serialize};

use crate::cards::PlayedCard;
use crate::player::TeamIdx;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub seat: usize,
    pub team: TeamIdx,
    pub card: PlayedCard,
}

/// A single trick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    plays: Vec<Play>,
    highest: Option<u8>,
    winner: Option<Play>,
    tie: bool,
    unbeatable: bool,
}

impl Round {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a play. `unseen_max` is the strongest card not yet seen in
    /// the deal; once the leading card is at least that strong it can no
    /// longer be beaten.
    pub fn use_card(&mut self, play: Play, unseen_max: Option<u8>) -> PlayedCard {
        if let Some(strength) = play.card.strength() {
            match (self.highest, self.winner) {
                (Some(h), _) if strength > h => self.lead(play, strength),
                (Some(h), Some(w)) if strength == h && w.team != play.team => self.tie = true,
                (None, _) => self.lead(play, strength),
                _ => {}
            }
        }
        self.plays.push(play);
        self.unbeatable = match (self.highest, unseen_max) {
            (Some(h), Some(m)) => h >= m,
            (Some(_), None) => true,
            (None, _) => false,
        };
        play.card
    }

    fn lead(&mut self, play: Play, strength: u8) {
        self.highest = Some(strength);
        self.winner = Some(play);
        self.tie = false;
    }

    pub fn plays(&self) -> &[Play] {
        &self.plays
    }

    pub fn highest(&self) -> Option<u8> {
        self.highest
    }

    /// Leading play so far (meaningful for the team only when not tied).
    pub fn winner(&self) -> Option<Play> {
        self.winner
    }

    pub fn is_tie(&self) -> bool {
        self.tie
    }

    pub fn is_unbeatable(&self) -> bool {
        self.unbeatable
    }

    /// Winning team of a decided trick, `None` for a parda. A trick where
    /// every card was burnt also counts as parda.
    pub fn result(&self) -> Option<TeamIdx> {
        if self.tie {
            None
        } else {
            self.winner.map(|w| w.team)
        }
    }

    pub fn has_played(&self, seat: usize) -> bool {
        self.plays.iter().any(|p| p.seat == seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(seat: usize, code: &str) -> Play {
        Play {
            seat,
            team: seat % 2,
            card: PlayedCard::Face(code.parse().unwrap()),
        }
    }

    #[test]
    fn highest_card_wins() {
        let mut r = Round::new();
        r.use_card(play(0, "3e"), Some(13));
        r.use_card(play(1, "7o"), Some(13));
        assert_eq!(r.winner().unwrap().seat, 1);
        assert_eq!(r.result(), Some(1));
        assert!(!r.is_tie());
    }

    #[test]
    fn equal_card_from_other_team_ties() {
        let mut r = Round::new();
        r.use_card(play(0, "3e"), Some(13));
        r.use_card(play(1, "3o"), Some(13));
        assert!(r.is_tie());
        assert_eq!(r.result(), None);
    }

    #[test]
    fn equal_card_from_partner_does_not_tie() {
        let mut r = Round::new();
        r.use_card(play(0, "3e"), Some(13));
        r.use_card(play(1, "4o"), Some(13));
        r.use_card(play(2, "3b"), Some(13));
        assert!(!r.is_tie());
        assert_eq!(r.winner().unwrap().seat, 0);
    }

    #[test]
    fn higher_card_clears_tie() {
        let mut r = Round::new();
        r.use_card(play(0, "2e"), Some(13));
        r.use_card(play(1, "2o"), Some(13));
        assert!(r.is_tie());
        r.use_card(play(2, "1b"), Some(13));
        assert!(!r.is_tie());
        assert_eq!(r.result(), Some(0));
    }

    #[test]
    fn burnt_card_never_leads() {
        let mut r = Round::new();
        r.use_card(
            Play {
                seat: 0,
                team: 0,
                card: PlayedCard::Burnt,
            },
            Some(13),
        );
        assert_eq!(r.result(), None);
        r.use_card(play(1, "4o"), Some(13));
        assert_eq!(r.result(), Some(1));
    }

    #[test]
    fn unbeatable_once_no_stronger_card_remains() {
        let mut r = Round::new();
        r.use_card(play(0, "1b"), Some(13));
        assert!(!r.is_unbeatable());
        let mut r = Round::new();
        r.use_card(play(0, "1b"), Some(11));
        assert!(r.is_unbeatable());
    }
}
