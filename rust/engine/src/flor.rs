use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::player::TeamIdx;
use crate::turn::TurnSequence;

/// Points for a flor nobody contests.
pub const UNOPPOSED_POINTS: u16 = 3;

/// A flor shown in a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlorEntry {
    pub seat: usize,
    pub team: TeamIdx,
    pub points: u8,
}

/// Outcome of an accepted flor: every holder's flor, in forehand order, and
/// the best one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlorBattle {
    pub entries: Vec<FlorEntry>,
    pub winner: FlorEntry,
    pub stake: u16,
}

impl FlorBattle {
    /// `entries` must be in forehand order; the earlier seat wins ties.
    pub fn resolve(entries: Vec<FlorEntry>, stake: u16) -> Option<Self> {
        let mut winner: Option<FlorEntry> = None;
        for e in &entries {
            if winner.map_or(true, |w| e.points > w.points) {
                winner = Some(*e);
            }
        }
        winner.map(|winner| Self {
            entries,
            winner,
            stake,
        })
    }
}

/// The flor sub-game for one hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flor {
    rung: Option<Command>,
    team_idx: Option<TeamIdx>,
    declared: Vec<usize>,
    waiting_answer: bool,
    accepted: bool,
    finished: bool,
    turn: TurnSequence,
    winner: Option<TeamIdx>,
    stake: u16,
}

impl Flor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.rung.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_pending(&self) -> bool {
        self.is_started() && !self.finished
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn is_waiting_answer(&self) -> bool {
        self.waiting_answer && !self.finished
    }

    /// Last call on the flor ladder.
    pub fn rung(&self) -> Option<Command> {
        self.rung
    }

    /// Team that made the last call.
    pub fn team_idx(&self) -> Option<TeamIdx> {
        self.team_idx
    }

    pub fn answering_team(&self) -> Option<TeamIdx> {
        if self.is_waiting_answer() {
            self.team_idx.map(|t| 1 - t)
        } else {
            None
        }
    }

    pub fn declared(&self) -> &[usize] {
        &self.declared
    }

    pub fn has_declared(&self, seat: usize) -> bool {
        self.declared.contains(&seat)
    }

    pub fn turn(&self) -> &TurnSequence {
        &self.turn
    }

    pub fn winner(&self) -> Option<TeamIdx> {
        self.winner
    }

    pub fn stake(&self) -> u16 {
        self.stake
    }

    /// Raises still open to the answering team.
    pub fn possible_raises(&self) -> Vec<Command> {
        match self.rung {
            Some(Command::Flor) => vec![Command::Contraflor, Command::ContraflorAlResto],
            Some(Command::Contraflor) => vec![Command::ContraflorAlResto],
            _ => Vec::new(),
        }
    }

    /// Paid to the winner of the battle when the last call is accepted.
    /// `resto` is the al-resto value for the current score.
    pub fn accept_stake(&self, resto: u16) -> u16 {
        match self.rung {
            Some(Command::Contraflor) => 6,
            Some(Command::ContraflorAlResto) => resto,
            _ => 4,
        }
    }

    /// Paid to the last caller's team when the last call is declined.
    pub fn decline_stake(&self) -> u16 {
        match self.rung {
            Some(Command::Contraflor) => 4,
            Some(Command::ContraflorAlResto) => 6,
            _ => UNOPPOSED_POINTS,
        }
    }

    /// Records a FLOR. The first one opens the sub-game: `answerers` are the
    /// opposing flor holders, `pending` this team's holders still to declare.
    pub fn declare(&mut self, seat: usize, team: TeamIdx, answerers: Vec<usize>, pending: Vec<usize>) {
        if !self.declared.contains(&seat) {
            self.declared.push(seat);
        }
        if self.rung.is_none() {
            self.rung = Some(Command::Flor);
            self.team_idx = Some(team);
            self.waiting_answer = !answerers.is_empty();
            self.turn = TurnSequence::new(answerers.into_iter().chain(pending).collect());
        } else {
            self.turn.remove(seat);
        }
    }

    pub fn raise(&mut self, command: Command, seat: usize, team: TeamIdx, answerers: Vec<usize>) -> bool {
        if !self.is_waiting_answer() || !self.possible_raises().contains(&command) {
            return false;
        }
        if !self.declared.contains(&seat) {
            self.declared.push(seat);
        }
        self.rung = Some(command);
        self.team_idx = Some(team);
        self.turn = TurnSequence::new(answerers);
        true
    }

    pub fn accept(&mut self, seat: usize) {
        if !self.declared.contains(&seat) {
            self.declared.push(seat);
        }
        self.accepted = true;
        self.waiting_answer = false;
        self.turn = TurnSequence::empty();
    }

    pub fn decline(&mut self) -> Option<TeamIdx> {
        let stake = self.decline_stake();
        self.close(self.team_idx, stake)
    }

    /// Nobody contested: the declaring team takes the flor points.
    pub fn finish_unopposed(&mut self) -> Option<TeamIdx> {
        self.close(self.team_idx, UNOPPOSED_POINTS)
    }

    pub fn finish_battle(&mut self, battle: &FlorBattle) -> Option<TeamIdx> {
        self.close(Some(battle.winner.team), battle.stake)
    }

    fn close(&mut self, winner: Option<TeamIdx>, stake: u16) -> Option<TeamIdx> {
        self.finished = true;
        self.waiting_answer = false;
        self.winner = winner;
        self.stake = stake;
        self.turn = TurnSequence::empty();
        winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(seat: usize, points: u8) -> FlorEntry {
        FlorEntry {
            seat,
            team: seat % 2,
            points,
        }
    }

    #[test]
    fn unopposed_flor_pays_three() {
        let mut f = Flor::new();
        f.declare(0, 0, vec![], vec![]);
        assert!(!f.is_waiting_answer());
        assert_eq!(f.finish_unopposed(), Some(0));
        assert_eq!(f.stake(), 3);
    }

    #[test]
    fn contested_flor_ladder_stakes() {
        let mut f = Flor::new();
        f.declare(0, 0, vec![1], vec![]);
        assert_eq!(f.answering_team(), Some(1));
        assert_eq!(f.accept_stake(30), 4);
        assert_eq!(f.decline_stake(), 3);
        assert!(f.raise(Command::Contraflor, 1, 1, vec![0]));
        assert_eq!((f.accept_stake(30), f.decline_stake()), (6, 4));
        assert!(f.raise(Command::ContraflorAlResto, 0, 0, vec![1]));
        assert_eq!((f.accept_stake(30), f.decline_stake()), (30, 6));
        assert!(f.possible_raises().is_empty());
        assert!(!f.raise(Command::Contraflor, 1, 1, vec![0]));
    }

    #[test]
    fn declined_contraflor_pays_four_to_raiser() {
        let mut f = Flor::new();
        f.declare(0, 0, vec![1], vec![]);
        f.raise(Command::Contraflor, 1, 1, vec![0]);
        assert_eq!(f.decline(), Some(1));
        assert_eq!(f.stake(), 4);
    }

    #[test]
    fn late_declaration_keeps_pending_answer() {
        let mut f = Flor::new();
        f.declare(0, 0, vec![1], vec![2]);
        f.declare(2, 0, Vec::new(), Vec::new());
        assert_eq!(f.turn().remaining(), &[1]);
        assert_eq!(f.answering_team(), Some(1));
        assert_eq!(f.declared(), &[0, 2]);
    }

    #[test]
    fn battle_tie_goes_to_earlier_seat() {
        let battle = FlorBattle::resolve(vec![entry(1, 33), entry(0, 33), entry(2, 30)], 4).unwrap();
        assert_eq!(battle.winner.seat, 1);
        let battle = FlorBattle::resolve(vec![entry(1, 25), entry(0, 33)], 6).unwrap();
        assert_eq!(battle.winner.team, 0);
        assert!(FlorBattle::resolve(vec![], 4).is_none());
    }
}
