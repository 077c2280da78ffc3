use serde::{Deserialize, Serialize};

use crate::commands::Command;
use crate::options::{FaltaEnvido, MatchOptions};
use crate::player::TeamIdx;
use crate::table::Table;
use crate::turn::TurnSequence;

/// One entry of the points phase. `points` is `None` for SON_BUENAS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvidoDeclaration {
    pub seat: usize,
    pub team: TeamIdx,
    pub points: Option<u8>,
}

/// The envido bet and its points phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envido {
    calls: Vec<Command>,
    accept: u16,
    decline: u16,
    falta: bool,
    team_idx: Option<TeamIdx>,
    accepted: bool,
    finished: bool,
    cancelled: bool,
    turn: TurnSequence,
    declarations: Vec<EnvidoDeclaration>,
    leader: Option<EnvidoDeclaration>,
    winner: Option<TeamIdx>,
    stake: u16,
}

impl Envido {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[Command] {
        &self.calls
    }

    pub fn is_started(&self) -> bool {
        !self.calls.is_empty()
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.is_started() && !self.finished
    }

    /// Team that made the last call.
    pub fn team_idx(&self) -> Option<TeamIdx> {
        self.team_idx
    }

    /// Team that owes an answer to the last call.
    pub fn answering_team(&self) -> Option<TeamIdx> {
        if self.is_pending() && !self.accepted {
            self.team_idx.map(|t| 1 - t)
        } else {
            None
        }
    }

    pub fn turn(&self) -> &TurnSequence {
        &self.turn
    }

    pub fn declarations(&self) -> &[EnvidoDeclaration] {
        &self.declarations
    }

    /// Best declaration so far.
    pub fn leader(&self) -> Option<EnvidoDeclaration> {
        self.leader
    }

    pub fn winner(&self) -> Option<TeamIdx> {
        self.winner
    }

    /// Points paid once finished.
    pub fn stake(&self) -> u16 {
        self.stake
    }

    /// Stake paid if the last call is declined.
    pub fn decline_stake(&self) -> u16 {
        self.decline
    }

    /// Calls still available: ENVIDO twice at most, REAL_ENVIDO once, and
    /// FALTA_ENVIDO closes the chain.
    pub fn possible_raises(&self) -> Vec<Command> {
        let count = |c: Command| self.calls.iter().filter(|&&x| x == c).count();
        let mut out = Vec::with_capacity(3);
        if self.falta {
            return out;
        }
        if count(Command::RealEnvido) == 0 {
            if count(Command::Envido) < 2 {
                out.push(Command::Envido);
            }
            out.push(Command::RealEnvido);
        }
        out.push(Command::FaltaEnvido);
        out
    }

    /// Adds a call. `answerers` are the seats of the opposing team in the
    /// order they may answer.
    pub fn say(&mut self, command: Command, team: TeamIdx, answerers: Vec<usize>) -> bool {
        if self.finished || !self.possible_raises().contains(&command) {
            return false;
        }
        self.decline = self.accept.max(1);
        match command {
            Command::Envido => self.accept += 2,
            Command::RealEnvido => self.accept += 3,
            Command::FaltaEnvido => self.falta = true,
            _ => return false,
        }
        self.calls.push(command);
        self.team_idx = Some(team);
        self.turn = TurnSequence::new(answerers);
        true
    }

    /// Opens the points phase. `order` is every active seat, forehand first.
    pub fn accept(&mut self, order: Vec<usize>) {
        self.accepted = true;
        self.turn = TurnSequence::new(order);
    }

    /// Declines the last call; the caller's team takes the decline stake.
    pub fn decline(&mut self) -> Option<TeamIdx> {
        self.finished = true;
        self.winner = self.team_idx;
        self.stake = self.decline;
        self.turn = TurnSequence::empty();
        self.winner
    }

    /// Records a declaration. Only a strictly better number takes the lead,
    /// so ties stay with the seat closer to the forehand.
    pub fn declare(&mut self, seat: usize, team: TeamIdx, points: Option<u8>) {
        let decl = EnvidoDeclaration { seat, team, points };
        self.declarations.push(decl);
        if let Some(p) = points {
            let better = match self.leader.and_then(|l| l.points) {
                Some(best) => p > best,
                None => true,
            };
            if better {
                self.leader = Some(decl);
            }
        }
        self.turn.consume(seat);
    }

    /// Settles the points phase. `falta_points` is only used when the chain
    /// ended in FALTA_ENVIDO.
    pub fn finish(&mut self, falta_points: u16) -> Option<TeamIdx> {
        self.finished = true;
        self.winner = self.leader.map(|l| l.team);
        self.stake = if self.falta {
            falta_points
        } else {
            self.accept
        };
        self.turn = TurnSequence::empty();
        self.winner
    }

    /// Discards the bet (a flor was declared).
    pub fn cancel(&mut self) {
        self.finished = true;
        self.cancelled = true;
        self.winner = None;
        self.stake = 0;
        self.turn = TurnSequence::empty();
    }
}

/// Stake of an accepted FALTA_ENVIDO.
///
/// The leading team decides the value: in buenas it pays what the leader
/// lacks to win; in malas it pays what the leader lacks to leave malas
/// (`Single`) or the whole match (`Double`).
pub fn falta_envido_points(table: &Table, options: &MatchOptions) -> u16 {
    let mp = u16::from(options.match_point);
    let [a, b] = [table.team(0).points(), table.team(1).points()];
    let leader = if b.total() > a.total() { b } else { a };
    if leader.in_buenas(options.match_point) {
        mp.saturating_sub(u16::from(leader.buenas)).max(1)
    } else {
        match options.falta_envido {
            FaltaEnvido::Single => mp.saturating_sub(u16::from(leader.malas)).max(1),
            FaltaEnvido::Double => (2 * mp).saturating_sub(leader.total()).max(1),
        }
    }
}
