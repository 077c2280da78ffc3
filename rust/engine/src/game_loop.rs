//! Async driver that feeds a [`Match`] to a [`DecisionHandler`].
//!
//! The loop pumps the match, dispatches each decision point to the handler
//! callback for its state and submits the returned action. Rejected actions
//! are logged and the same decision point is offered again; handler failures
//! follow the match's [`HandlerPolicy`].

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::commands::Action;
use crate::errors::EngineError;
use crate::flor::FlorBattle;
use crate::game::{Match, MatchResult, MatchStep};
use crate::hand::{HandState, HandSummary, PlayInstance};
use crate::options::HandlerPolicy;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Host callbacks. Deciding callbacks receive the snapshot for the seat that
/// must act and return that seat's action.
#[async_trait]
pub trait DecisionHandler: Send {
    /// A card play (or fold, truco, envido opening) is due.
    async fn on_turn(&mut self, play: &PlayInstance) -> Result<Action, HandlerError>;

    /// A truco raise awaits an answer.
    async fn on_truco(&mut self, play: &PlayInstance) -> Result<Action, HandlerError>;

    /// An envido call awaits an answer, or envido points are due.
    async fn on_envido(&mut self, play: &PlayInstance) -> Result<Action, HandlerError>;

    /// A flor awaits an answer or a declaration.
    async fn on_flor(&mut self, play: &PlayInstance) -> Result<Action, HandlerError>;

    async fn on_flor_battle(&mut self, _battle: &FlorBattle) -> Result<(), HandlerError> {
        Ok(())
    }

    async fn on_hand_finished(&mut self, summary: &HandSummary) -> Result<(), HandlerError>;

    async fn on_winner(&mut self, result: &MatchResult) -> Result<(), HandlerError>;
}

pub struct GameLoop<H> {
    game: Match,
    handler: H,
    failures: u8,
}

impl<H: DecisionHandler> GameLoop<H> {
    pub fn new(game: Match, handler: H) -> Self {
        Self {
            game,
            handler,
            failures: 0,
        }
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_parts(self) -> (Match, H) {
        (self.game, self.handler)
    }

    /// Plays the match to the end.
    pub async fn begin(&mut self) -> Result<MatchResult, EngineError> {
        loop {
            match self.game.play()? {
                MatchStep::Decision(play) => {
                    let outcome = match play.state {
                        HandState::WaitingForTrucoAnswer => self.handler.on_truco(&play).await,
                        HandState::WaitingEnvidoAnswer | HandState::WaitingEnvidoPointsAnswer => {
                            self.handler.on_envido(&play).await
                        }
                        HandState::WaitingFlorAnswer => self.handler.on_flor(&play).await,
                        _ => self.handler.on_turn(&play).await,
                    };
                    match outcome {
                        Ok(action) => self.submit(&play, action),
                        Err(e) => {
                            if let Some(result) = self.handler_failed(e) {
                                return Ok(self.announce(result).await);
                            }
                        }
                    }
                }
                MatchStep::FlorBattle(battle) => {
                    if let Err(e) = self.handler.on_flor_battle(&battle).await {
                        if let Some(result) = self.handler_failed(e) {
                            return Ok(self.announce(result).await);
                        }
                    }
                }
                MatchStep::HandFinished(summary) => {
                    if let Err(e) = self.handler.on_hand_finished(&summary).await {
                        if let Some(result) = self.handler_failed(e) {
                            return Ok(self.announce(result).await);
                        }
                    }
                }
                MatchStep::MatchFinished(result) => return Ok(self.announce(result).await),
            }
        }
    }

    fn submit(&mut self, play: &PlayInstance, action: Action) {
        match self.game.act(play.decision_id, action) {
            Ok(()) => {
                self.failures = 0;
                debug!(decision = play.decision_id, seat = action.seat, "action accepted");
            }
            Err(e) => warn!(
                decision = play.decision_id,
                seat = action.seat,
                error = %e,
                "action rejected"
            ),
        }
    }

    /// Applies the handler policy. Returns the aborted result once retries
    /// are exhausted.
    fn handler_failed(&mut self, e: HandlerError) -> Option<MatchResult> {
        self.failures = self.failures.saturating_add(1);
        error!(error = %e, failures = self.failures, "decision handler failed");
        let give_up = match self.game.options().handler_policy {
            HandlerPolicy::Abort => true,
            HandlerPolicy::Retry { attempts } => self.failures > attempts,
        };
        give_up.then(|| self.game.force_winner(0))
    }

    async fn announce(&mut self, result: MatchResult) -> MatchResult {
        if let Err(e) = self.handler.on_winner(&result).await {
            error!(error = %e, "winner callback failed");
        }
        result
    }
}
