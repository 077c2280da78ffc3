use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::player::{Player, TeamIdx};
use crate::team::Team;

/// Seating for both teams. Seats alternate by team: seat `s` belongs to team
/// `s % 2` and is player `s / 2` of that team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    teams: [Team; 2],
    forehand_idx: usize,
}

impl Table {
    /// Seats two teams given their players' identity tokens.
    pub fn new<S: Into<String>>(team0: Vec<S>, team1: Vec<S>) -> Result<Self, EngineError> {
        let (n0, n1) = (team0.len(), team1.len());
        if n0 != n1 || !(1..=3).contains(&n0) {
            return Err(EngineError::InvalidTeamSizes(n0, n1));
        }
        let seat_team = |team: TeamIdx, ids: Vec<S>| {
            ids.into_iter()
                .enumerate()
                .map(|(i, id)| Player::new(id, i * 2 + team))
                .collect::<Vec<_>>()
        };
        Ok(Self {
            teams: [
                Team::new(0, seat_team(0, team0)),
                Team::new(1, seat_team(1, team1)),
            ],
            forehand_idx: 0,
        })
    }

    pub fn seats(&self) -> usize {
        self.teams[0].players().len() * 2
    }

    pub fn forehand_idx(&self) -> usize {
        self.forehand_idx
    }

    /// Moves the forehand one seat to the right.
    pub fn rotate_forehand(&mut self) {
        self.forehand_idx = (self.forehand_idx + 1) % self.seats();
    }

    pub fn team(&self, idx: TeamIdx) -> &Team {
        &self.teams[idx]
    }

    pub fn team_mut(&mut self, idx: TeamIdx) -> &mut Team {
        &mut self.teams[idx]
    }

    pub fn teams(&self) -> &[Team; 2] {
        &self.teams
    }

    pub fn player(&self, seat: usize) -> Result<&Player, EngineError> {
        self.teams
            .get(seat % 2)
            .and_then(|t| t.players().get(seat / 2))
            .ok_or(EngineError::UnknownSeat(seat))
    }

    pub fn player_mut(&mut self, seat: usize) -> Result<&mut Player, EngineError> {
        self.teams
            .get_mut(seat % 2)
            .and_then(|t| t.players_mut().get_mut(seat / 2))
            .ok_or(EngineError::UnknownSeat(seat))
    }

    /// All players in seat order.
    pub fn players(&self) -> impl Iterator<Item = &Player> + '_ {
        (0..self.seats()).filter_map(move |s| self.player(s).ok())
    }

    /// Seats in playing order starting at `start`.
    pub fn seats_from(&self, start: usize) -> Vec<usize> {
        let n = self.seats();
        (0..n).map(|i| (start + i) % n).collect()
    }

    /// Seats in playing order starting at the forehand.
    pub fn forehand_first(&self) -> Vec<usize> {
        self.seats_from(self.forehand_idx)
    }

    pub fn is_active(&self, seat: usize) -> bool {
        self.player(seat).map(Player::is_active).unwrap_or(false)
    }
}
