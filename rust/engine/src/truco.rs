use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::player::TeamIdx;
use crate::turn::TurnSequence;

/// Value of the hand when nobody raised or every raise was declined.
pub const BASE_VALUE: u8 = 1;
pub const MAX_VALUE: u8 = 4;

/// The truco ladder for one hand.
///
/// `rung` is the value on the table (1 before any raise, up to 4 after
/// VALE_CUATRO); `accepted` only moves when a raise is answered with QUIERO
/// or implicitly accepted by a counter-raise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truco {
    rung: u8,
    accepted: u8,
    team_idx: Option<TeamIdx>,
    waiting_answer: bool,
    turn: TurnSequence,
    declined_by: Option<TeamIdx>,
}

impl Default for Truco {
    fn default() -> Self {
        Self::new()
    }
}

impl Truco {
    pub fn new() -> Self {
        Self {
            rung: BASE_VALUE,
            accepted: BASE_VALUE,
            team_idx: None,
            waiting_answer: false,
            turn: TurnSequence::empty(),
            declined_by: None,
        }
    }

    pub fn rung(&self) -> u8 {
        self.rung
    }

    /// Points the hand is worth right now.
    pub fn value(&self) -> u8 {
        self.accepted
    }

    /// Team that made the last raise.
    pub fn team_idx(&self) -> Option<TeamIdx> {
        self.team_idx
    }

    pub fn is_waiting_answer(&self) -> bool {
        self.waiting_answer
    }

    /// Team that owes an answer to the pending raise.
    pub fn answering_team(&self) -> Option<TeamIdx> {
        match (self.waiting_answer, self.team_idx) {
            (true, Some(t)) => Some(1 - t),
            _ => None,
        }
    }

    pub fn turn(&self) -> &TurnSequence {
        &self.turn
    }

    pub fn declined_by(&self) -> Option<TeamIdx> {
        self.declined_by
    }

    /// The command that would move the ladder up one rung.
    pub fn next_command(&self) -> Option<Command> {
        match self.rung {
            1 => Some(Command::Truco),
            2 => Some(Command::ReTruco),
            3 => Some(Command::ValeCuatro),
            _ => None,
        }
    }

    /// A team may raise unless it owns the last raise or the ladder is full.
    pub fn can_raise(&self, team: TeamIdx) -> bool {
        self.declined_by.is_none() && self.rung < MAX_VALUE && self.team_idx != Some(team)
    }

    /// Raises one rung. Raising while answering accepts the pending rung.
    pub fn raise(&mut self, team: TeamIdx, answerers: Vec<usize>) -> Option<Command> {
        if !self.can_raise(team) {
            return None;
        }
        let command = self.next_command()?;
        if self.waiting_answer {
            self.accepted = self.rung;
        }
        self.rung += 1;
        self.team_idx = Some(team);
        self.waiting_answer = true;
        self.turn = TurnSequence::new(answerers);
        Some(command)
    }

    pub fn accept(&mut self) {
        if self.waiting_answer {
            self.accepted = self.rung;
            self.waiting_answer = false;
            self.turn = TurnSequence::empty();
        }
    }

    /// Declines the pending raise. Returns the team that takes the hand at
    /// the last accepted value.
    pub fn decline(&mut self) -> Option<TeamIdx> {
        let answering = self.answering_team()?;
        self.waiting_answer = false;
        self.turn = TurnSequence::empty();
        self.declined_by = Some(answering);
        self.team_idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unraised_hand_is_worth_one() {
        let t = Truco::new();
        assert_eq!(t.value(), 1);
        assert_eq!(t.next_command(), Some(Command::Truco));
    }

    #[test]
    fn accepted_truco_is_worth_two() {
        let mut t = Truco::new();
        assert_eq!(t.raise(0, vec![1]), Some(Command::Truco));
        assert_eq!(t.answering_team(), Some(1));
        assert_eq!(t.value(), 1);
        t.accept();
        assert_eq!(t.value(), 2);
        assert!(!t.is_waiting_answer());
    }

    #[test]
    fn raising_team_cannot_raise_again() {
        let mut t = Truco::new();
        t.raise(0, vec![1]);
        t.accept();
        assert!(!t.can_raise(0));
        assert!(t.can_raise(1));
    }

    #[test]
    fn counter_raise_accepts_previous_rung() {
        let mut t = Truco::new();
        t.raise(0, vec![1]);
        assert_eq!(t.raise(1, vec![0]), Some(Command::ReTruco));
        assert_eq!(t.value(), 2);
        assert_eq!(t.decline(), Some(1));
        assert_eq!(t.value(), 2);
        assert_eq!(t.declined_by(), Some(0));
    }

    #[test]
    fn vale_cuatro_is_the_top() {
        let mut t = Truco::new();
        t.raise(0, vec![1]);
        t.raise(1, vec![0]);
        assert_eq!(t.raise(0, vec![1]), Some(Command::ValeCuatro));
        t.accept();
        assert_eq!(t.value(), 4);
        assert!(!t.can_raise(1));
        assert_eq!(t.next_command(), None);
    }

    #[test]
    fn declined_first_truco_pays_one() {
        let mut t = Truco::new();
        t.raise(1, vec![0]);
        assert_eq!(t.decline(), Some(1));
        assert_eq!(t.value(), 1);
    }
}
