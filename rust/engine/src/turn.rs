use serde::{Deserialize, Serialize};

/// A finite, restartable order of seats expected to act.
///
/// Sub-games create a new sequence every time the set of players owing an
/// answer changes. Seats that become ineligible (disabled, abandoned, already
/// answered) are skipped by [`TurnSequence::current`] without being consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSequence {
    seats: Vec<usize>,
    cursor: usize,
}

impl TurnSequence {
    pub fn new(seats: Vec<usize>) -> Self {
        Self { seats, cursor: 0 }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// First eligible seat still owed a turn, or `None` once exhausted.
    pub fn current(&self, eligible: impl Fn(usize) -> bool) -> Option<usize> {
        self.remaining().iter().copied().find(|&s| eligible(s))
    }

    /// Consumes `seat` and every seat queued before it.
    pub fn consume(&mut self, seat: usize) {
        if let Some(pos) = self.remaining().iter().position(|&s| s == seat) {
            self.cursor += pos + 1;
        }
    }

    /// Drops `seat` alone, leaving the seats queued ahead of it in place.
    /// Used when a seat acts out of order.
    pub fn remove(&mut self, seat: usize) {
        if let Some(pos) = self.remaining().iter().position(|&s| s == seat) {
            self.seats.remove(self.cursor + pos);
        }
    }

    /// Seats not yet consumed, eligible or not.
    pub fn remaining(&self) -> &[usize] {
        self.seats.get(self.cursor..).unwrap_or(&[])
    }

    pub fn contains(&self, seat: usize) -> bool {
        self.remaining().contains(&seat)
    }
}
