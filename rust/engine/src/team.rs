use serde::{Deserialize, Serialize};

use crate::player::{Player, TeamIdx};

/// Two-stage score: malas fill up to the match point, then buenas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPoints {
    pub malas: u8,
    pub buenas: u8,
    pub winner: bool,
}

impl TeamPoints {
    pub fn total(&self) -> u16 {
        u16::from(self.malas) + u16::from(self.buenas)
    }

    pub fn in_buenas(&self, match_point: u8) -> bool {
        self.malas >= match_point
    }

    /// Score after adding `points`, without mutating.
    pub fn with_points(&self, points: u16, match_point: u8) -> TeamPoints {
        let mp = u16::from(match_point);
        let total = (self.total() + points).min(2 * mp);
        let malas = total.min(mp);
        let buenas = total - malas;
        TeamPoints {
            malas: malas as u8,
            buenas: buenas as u8,
            winner: buenas >= mp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamIdx,
    players: Vec<Player>,
    points: TeamPoints,
}

impl Team {
    pub fn new(id: TeamIdx, players: Vec<Player>) -> Self {
        Self {
            id,
            players,
            points: TeamPoints::default(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn points(&self) -> TeamPoints {
        self.points
    }

    pub fn add_points(&mut self, points: u16, match_point: u8) -> TeamPoints {
        self.points = self.points.with_points(points, match_point);
        self.points
    }

    /// Whether `points` more would win the match for this team.
    pub fn would_win(&self, points: u16, match_point: u8) -> bool {
        self.points.with_points(points, match_point).winner
    }

    pub fn is_all_disabled(&self) -> bool {
        self.players.iter().all(|p| !p.is_active())
    }

    pub fn is_all_abandoned(&self) -> bool {
        self.players.iter().all(|p| p.abandoned)
    }

    pub fn set_winner(&mut self) {
        self.points.winner = true;
    }
}
