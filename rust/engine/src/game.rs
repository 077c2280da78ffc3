use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cards::{Card, PlayedCard};
use crate::commands::{Action, Say};
use crate::deck::Deck;
use crate::errors::EngineError;
use crate::flor::FlorBattle;
use crate::hand::{Hand, HandStep, HandSummary, PlayInstance};
use crate::options::MatchOptions;
use crate::player::TeamIdx;
use crate::random::{EntropySource, FairnessError, Random, Reveal};
use crate::table::Table;
use crate::team::TeamPoints;

/// Final outcome of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: TeamIdx,
    pub scores: [TeamPoints; 2],
    pub hands: u32,
    /// A whole team abandoned.
    pub forfeit: bool,
    /// Ended by the host after a failure rather than by play.
    pub aborted: bool,
}

/// Result of pumping a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStep {
    Decision(PlayInstance),
    FlorBattle(FlorBattle),
    HandFinished(HandSummary),
    MatchFinished(MatchResult),
}

/// A match between two teams, played hand after hand until one team reaches
/// the match point twice (malas, then buenas).
pub struct Match {
    options: MatchOptions,
    table: Table,
    deck: Deck,
    entropy: Box<dyn EntropySource>,
    hand: Option<Hand>,
    history: Vec<Hand>,
    next_decision: u64,
    result: Option<MatchResult>,
}

impl Match {
    pub fn new(
        table: Table,
        options: MatchOptions,
        random: Random,
        entropy: Box<dyn EntropySource>,
    ) -> Result<Self, EngineError> {
        options.validate()?;
        info!(
            seats = table.seats(),
            match_point = options.match_point,
            flor = options.flor,
            "match created"
        );
        Ok(Self {
            options,
            table,
            deck: Deck::new(random),
            entropy,
            hand: None,
            history: Vec::new(),
            next_decision: 0,
            result: None,
        })
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn current_hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    /// Finished hands, oldest first.
    pub fn history(&self) -> &[Hand] {
        &self.history
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    pub fn scores(&self) -> [TeamPoints; 2] {
        [self.table.team(0).points(), self.table.team(1).points()]
    }

    /// Published commitment to the server secret.
    pub fn commitment(&self) -> String {
        self.deck.random().commitment()
    }

    pub fn set_client_seed(&mut self, seat: usize, seed: impl Into<String>) -> Result<(), FairnessError> {
        self.deck.random_mut().set_client_seed(seat, seed)
    }

    /// Secret and seeds for verification. Only available once the match is
    /// over.
    pub fn reveal(&self) -> Option<Reveal> {
        self.result.as_ref().map(|_| self.deck.random().reveal())
    }

    /// Advances the match to its next observable step.
    pub fn play(&mut self) -> Result<MatchStep, EngineError> {
        if let Some(result) = &self.result {
            return Ok(MatchStep::MatchFinished(result.clone()));
        }
        if let Some(team) = (0..2).find(|&t| self.table.team(t).is_all_abandoned()) {
            warn!(team, "team abandoned, match forfeited");
            return Ok(MatchStep::MatchFinished(self.finish(1 - team, true, false)));
        }
        if self.hand.is_none() {
            self.start_hand()?;
        }
        let hand = self.hand.as_mut().ok_or(EngineError::NoActiveHand)?;
        match hand.play(&mut self.table) {
            HandStep::Decision(p) => Ok(MatchStep::Decision(p)),
            HandStep::FlorBattle(b) => Ok(MatchStep::FlorBattle(b)),
            HandStep::Finished(summary) => {
                self.settle_hand(&summary);
                Ok(MatchStep::HandFinished(summary))
            }
        }
    }

    pub fn use_card(
        &mut self,
        decision_id: u64,
        seat: usize,
        card_idx: usize,
        card: Card,
    ) -> Result<PlayedCard, EngineError> {
        let (hand, table) = self.hand_mut()?;
        hand.use_card(table, decision_id, seat, card_idx, card, false)
    }

    pub fn burn_card(
        &mut self,
        decision_id: u64,
        seat: usize,
        card_idx: usize,
        card: Card,
    ) -> Result<PlayedCard, EngineError> {
        let (hand, table) = self.hand_mut()?;
        hand.use_card(table, decision_id, seat, card_idx, card, true)
    }

    pub fn say(&mut self, decision_id: u64, seat: usize, say: Say) -> Result<Say, EngineError> {
        let (hand, table) = self.hand_mut()?;
        hand.say(table, decision_id, seat, say)
    }

    pub fn act(&mut self, decision_id: u64, action: Action) -> Result<(), EngineError> {
        let (hand, table) = self.hand_mut()?;
        hand.act(table, decision_id, action)
    }

    /// Host-injected answer after a turn timeout.
    pub fn force_fold(&mut self, seat: usize) -> Result<Say, EngineError> {
        let (hand, table) = self.hand_mut()?;
        hand.force_fold(table, seat)
    }

    /// Marks a seat as gone for good. A team with every seat abandoned
    /// forfeits at the next [`Match::play`].
    pub fn abandon_player(&mut self, seat: usize) -> Result<(), EngineError> {
        if self.result.is_some() {
            return Err(EngineError::MatchFinished);
        }
        match self.hand.as_mut() {
            Some(hand) => hand.abandon(&mut self.table, seat)?,
            None => self.table.player_mut(seat)?.abandon(),
        }
        warn!(seat, "player abandoned");
        Ok(())
    }

    /// Ends the match for `winner` without further play.
    pub fn force_winner(&mut self, winner: TeamIdx) -> MatchResult {
        if let Some(result) = &self.result {
            return result.clone();
        }
        warn!(team = winner, "match aborted");
        self.finish(winner, false, true)
    }

    fn hand_mut(&mut self) -> Result<(&mut Hand, &mut Table), EngineError> {
        if self.result.is_some() {
            return Err(EngineError::MatchFinished);
        }
        let hand = self.hand.as_mut().ok_or(EngineError::NoActiveHand)?;
        Ok((hand, &mut self.table))
    }

    fn start_hand(&mut self) -> Result<(), EngineError> {
        let idx = self.history.len() as u32;
        let block_hash = self.entropy.block_hash(idx);
        let hand = Hand::new(
            idx,
            &mut self.table,
            &mut self.deck,
            &block_hash,
            self.options.clone(),
            self.next_decision,
        )?;
        self.hand = Some(hand);
        Ok(())
    }

    fn settle_hand(&mut self, summary: &HandSummary) {
        let mp = self.options.match_point;
        for team in 0..2 {
            let points = summary.points.total(team);
            if points > 0 {
                self.table.team_mut(team).add_points(points, mp);
            }
        }
        if let Some(mut hand) = self.hand.take() {
            hand.close();
            self.next_decision = hand.decision_id() + 1;
            self.history.push(hand);
        }
        self.table.rotate_forehand();
        let [a, b] = self.scores();
        info!(
            hand = summary.idx,
            team0 = a.total(),
            team1 = b.total(),
            "score"
        );
        let winner = match (a.winner, b.winner) {
            (true, true) => Some(summary.winner.unwrap_or(0)),
            (true, false) => Some(0),
            (false, true) => Some(1),
            (false, false) => None,
        };
        if let Some(team) = winner {
            self.finish(team, false, false);
        }
    }

    fn finish(&mut self, winner: TeamIdx, forfeit: bool, aborted: bool) -> MatchResult {
        self.table.team_mut(winner).set_winner();
        let result = MatchResult {
            winner,
            scores: self.scores(),
            hands: self.history.len() as u32,
            forfeit,
            aborted,
        };
        info!(team = winner, hands = result.hands, forfeit, aborted, "match finished");
        self.result = Some(result.clone());
        result
    }
}

impl std::fmt::Debug for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Match")
            .field("options", &self.options)
            .field("table", &self.table)
            .field("hand", &self.hand.as_ref().map(Hand::idx))
            .field("hands_played", &self.history.len())
            .field("result", &self.result)
            .finish()
    }
}
