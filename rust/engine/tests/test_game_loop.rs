use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::Level;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

use truco_engine::commands::{Action, ActionKind, Command, Say};
use truco_engine::game::{Match, MatchResult};
use truco_engine::game_loop::{DecisionHandler, GameLoop, HandlerError};
use truco_engine::hand::{HandSummary, PlayInstance};
use truco_engine::options::{HandlerPolicy, MatchOptions};
use truco_engine::random::{HashChain, Random};
use truco_engine::table::Table;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

impl Captured {
    fn count(&self, level: Level, message: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, m)| *l == level && m == message)
            .count()
    }
}

impl<S: tracing::Subscriber> Layer<S> for Captured {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Message(Option<String>);
        impl tracing::field::Visit for Message {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.0 = Some(format!("{:?}", value));
                }
            }
        }
        let mut visitor = Message(None);
        event.record(&mut visitor);
        self.0
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0.unwrap_or_default()));
    }
}

fn new_match(seed: u64, policy: HandlerPolicy) -> Match {
    let table = Table::new(vec!["a"], vec!["b"]).unwrap();
    let opts = MatchOptions {
        match_point: 5,
        handler_policy: policy,
        ..MatchOptions::default()
    };
    Match::new(
        table,
        opts,
        Random::from_seed(seed, 2),
        Box::new(HashChain::new(seed)),
    )
    .unwrap()
}

/// Plays the first legal action, optionally sending one illegal action
/// first and failing a number of times.
#[derive(Default)]
struct Scripted {
    send_illegal_once: bool,
    fail_every_time: bool,
    decisions: usize,
    hands: usize,
    winner: Option<MatchResult>,
}

impl Scripted {
    fn decide(&mut self, play: &PlayInstance) -> Result<Action, HandlerError> {
        if self.fail_every_time {
            return Err("handler offline".into());
        }
        self.decisions += 1;
        if self.send_illegal_once {
            self.send_illegal_once = false;
            return Ok(Action::say(play.seat, Command::ValeCuatro));
        }
        let actions = play.legal_actions();
        let prefer = actions.iter().find(|a| {
            matches!(
                a.kind,
                ActionKind::Say {
                    say: Say::Command(Command::NoQuiero | Command::Flor | Command::SonBuenas)
                }
            )
        });
        Ok(*prefer.unwrap_or(&actions[0]))
    }
}

#[async_trait]
impl DecisionHandler for Scripted {
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

    async fn on_hand_finished(&mut self, _summary: &HandSummary) -> Result<(), HandlerError> {
        self.hands += 1;
        Ok(())
    }

    async fn on_winner(&mut self, result: &MatchResult) -> Result<(), HandlerError> {
        self.winner = Some(result.clone());
        Ok(())
    }
}

#[tokio::test]
async fn loop_plays_match_and_reports_winner() {
    let mut game_loop = GameLoop::new(new_match(21, HandlerPolicy::Abort), Scripted::default());
    let result = game_loop.begin().await.expect("match result");
    assert!(!result.aborted);
    let (game, handler) = game_loop.into_parts();
    assert_eq!(handler.hands as u32, result.hands);
    assert_eq!(handler.winner.as_ref(), Some(&result));
    assert_eq!(game.result(), Some(&result));
}

#[tokio::test]
async fn rejected_action_is_logged_and_reoffered() {
    let captured = Captured::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(captured.clone()));
    let handler = Scripted {
        send_illegal_once: true,
        ..Scripted::default()
    };
    let mut game_loop = GameLoop::new(new_match(4, HandlerPolicy::Abort), handler);
    let result = game_loop.begin().await.expect("match result");
    assert!(!result.aborted);
    assert_eq!(captured.count(Level::WARN, "action rejected"), 1);
}

#[tokio::test]
async fn failing_handler_aborts_after_retries() {
    let captured = Captured::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(captured.clone()));
    let handler = Scripted {
        fail_every_time: true,
        ..Scripted::default()
    };
    let mut game_loop = GameLoop::new(
        new_match(4, HandlerPolicy::Retry { attempts: 2 }),
        handler,
    );
    let result = game_loop.begin().await.expect("aborted result");
    assert!(result.aborted);
    assert_eq!(result.winner, 0);
    assert_eq!(result.hands, 0);
    assert_eq!(captured.count(Level::ERROR, "decision handler failed"), 3);
    let (_, handler) = game_loop.into_parts();
    assert_eq!(handler.winner.map(|r| r.aborted), Some(true));
}
