//! Seats bots at a table and drives them from the engine's game loop.

use async_trait::async_trait;
use tracing::debug;
use truco_engine::commands::Action;
use truco_engine::game::MatchResult;
use truco_engine::game_loop::{DecisionHandler, HandlerError};
use truco_engine::hand::{HandSummary, PlayInstance};

use crate::BotStrategy;

/// One bot per seat. Finished hands are kept so the host can log them once
/// the match is over.
pub struct BotTable {
    bots: Vec<Box<dyn BotStrategy>>,
    finished: Vec<HandSummary>,
    result: Option<MatchResult>,
}

impl BotTable {
    pub fn new(bots: Vec<Box<dyn BotStrategy>>) -> Self {
        Self {
            bots,
            finished: Vec::new(),
            result: None,
        }
    }

    pub fn seats(&self) -> usize {
        self.bots.len()
    }

    pub fn finished(&self) -> &[HandSummary] {
        &self.finished
    }

    pub fn take_finished(&mut self) -> Vec<HandSummary> {
        std::mem::take(&mut self.finished)
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    fn decide(&mut self, play: &PlayInstance) -> Result<Action, HandlerError> {
        let bot = self
            .bots
            .get_mut(play.seat)
            .ok_or_else(|| format!("no bot seated at {}", play.seat))?;
        let action = bot.decide(play);
        debug!(bot = bot.name(), seat = play.seat, state = ?play.state, kind = ?action.kind, "bot decided");
        Ok(action)
    }
}

#[async_trait]
impl DecisionHandler for BotTable {
    async fn on_turn(&mut self, play: &PlayInstance) -> Result<Action, HandlerError> {
        self.decide(play)
    }

    async fn on_truco(&mut self, play: &PlayInstance) -> Result<Action, HandlerError> {
        self.decide(play)
    }

    async fn on_envido(&mut self, play: &PlayInstance) -> Result<Action, HandlerError> {
        self.decide(play)
    }

    async fn on_flor(&mut self, play: &PlayInstance) -> Result<Action, HandlerError> {
        self.decide(play)
    }

    async fn on_hand_finished(&mut self, summary: &HandSummary) -> Result<(), HandlerError> {
        self.finished.push(summary.clone());
        Ok(())
    }

    async fn on_winner(&mut self, result: &MatchResult) -> Result<(), HandlerError> {
        self.result = Some(result.clone());
        Ok(())
    }
}
