use std::collections::HashSet;

use truco_engine::commands::{Action, Command, Say};
use truco_engine::deck::{verify_shuffle, Deck};
use truco_engine::errors::EngineError;
use truco_engine::game::{Match, MatchStep};
use truco_engine::logger::HandRecord;
use truco_engine::options::MatchOptions;
use truco_engine::random::{HashChain, Random};
use truco_engine::table::Table;

fn new_match(seed: u64, per_team: usize, match_point: u8) -> Match {
    let team0: Vec<String> = (0..per_team).map(|i| format!("a{}", i)).collect();
    let team1: Vec<String> = (0..per_team).map(|i| format!("b{}", i)).collect();
    let table = Table::new(team0, team1).unwrap();
    let opts = MatchOptions {
        match_point,
        ..MatchOptions::default()
    };
    Match::new(
        table,
        opts,
        Random::from_seed(seed, per_team * 2),
        Box::new(HashChain::new(seed)),
    )
    .expect("match")
}

/// Prefers folding bets and playing the first card, so matches stay short
/// and deterministic.
fn pick(actions: &[Action]) -> Action {
    let prefer = [
        Say::Command(Command::Flor),
        Say::Command(Command::NoQuiero),
        Say::Command(Command::SonBuenas),
    ];
    for want in prefer {
        if let Some(a) = actions.iter().find(|a| {
            matches!(a.kind, truco_engine::commands::ActionKind::Say { say } if say == want)
        }) {
            return *a;
        }
    }
    actions[0]
}

fn run_to_end(game: &mut Match) -> Vec<truco_engine::hand::HandSummary> {
    let mut summaries = Vec::new();
    for _ in 0..20_000 {
        match game.play().expect("play") {
            MatchStep::Decision(p) => {
                let actions = p.legal_actions();
                assert!(!actions.is_empty(), "no legal action at {:?}", p.state);
                game.act(p.decision_id, pick(&actions)).expect("legal action");
            }
            MatchStep::FlorBattle(_) => {}
            MatchStep::HandFinished(s) => summaries.push(s),
            MatchStep::MatchFinished(_) => return summaries,
        }
    }
    panic!("match did not finish");
}

#[test]
fn heads_up_match_runs_to_a_winner() {
    let mut game = new_match(42, 1, 5);
    let summaries = run_to_end(&mut game);
    let result = game.result().cloned().expect("result");
    assert!(result.scores[result.winner].winner);
    assert_eq!(result.scores[result.winner].buenas, 5);
    assert_eq!(result.hands as usize, summaries.len());
    assert!(!result.aborted && !result.forfeit);
}

#[test]
fn forehand_rotates_every_hand() {
    let mut game = new_match(9, 2, 4);
    let summaries = run_to_end(&mut game);
    for (i, s) in summaries.iter().enumerate() {
        assert_eq!(s.forehand, i % 4, "hand {}", i);
    }
}

#[test]
fn three_a_side_deals_eighteen_distinct_cards() {
    let mut game = new_match(3, 3, 3);
    match game.play().unwrap() {
        MatchStep::Decision(_) => {}
        other => panic!("unexpected {:?}", other),
    }
    let hand = game.current_hand().expect("hand");
    let dealt = hand.summary().dealt;
    assert_eq!(dealt.len(), 6);
    let all: HashSet<_> = dealt.iter().flat_map(|d| d.cards.clone()).collect();
    assert_eq!(all.len(), 18);
}

#[test]
fn every_deal_verifies_after_reveal() {
    let mut game = new_match(77, 1, 6);
    game.set_client_seed(1, "seat-one-seed").unwrap();
    assert!(game.reveal().is_none(), "secret stays hidden during play");
    let summaries = run_to_end(&mut game);
    let reveal = game.reveal().expect("reveal after match");
    assert!(summaries.len() > 1);
    for s in &summaries {
        let rec = HandRecord::from_summary(format!("h{}", s.idx), Some(77), s, game.scores());
        assert!(rec.verify_deal(&reveal).unwrap(), "hand {} deal mismatch", s.idx);
        assert_eq!(verify_shuffle(&reveal, &s.proof).unwrap().len(), 40);
    }
}

#[test]
fn nonce_never_repeats_across_hands() {
    let mut deck = Deck::new(Random::from_seed(5, 2));
    let a = deck.shuffle(0, "h0").unwrap();
    let b = deck.shuffle(1, "h1").unwrap();
    assert!(b.start_nonce >= a.start_nonce + 39);
}

#[test]
fn stale_decision_after_action() {
    let mut game = new_match(1, 1, 5);
    let p = match game.play().unwrap() {
        MatchStep::Decision(p) => p,
        other => panic!("unexpected {:?}", other),
    };
    let action = pick(&p.legal_actions());
    game.act(p.decision_id, action).unwrap();
    let err = game.act(p.decision_id, action).unwrap_err();
    assert!(matches!(err, EngineError::StaleDecision { .. }));
}

#[test]
fn abandoned_team_forfeits() {
    let mut game = new_match(8, 2, 5);
    assert!(matches!(game.play().unwrap(), MatchStep::Decision(_)));
    game.abandon_player(1).unwrap();
    game.abandon_player(3).unwrap();
    match game.play().unwrap() {
        MatchStep::MatchFinished(r) => {
            assert_eq!(r.winner, 0);
            assert!(r.forfeit);
        }
        other => panic!("expected forfeit, got {:?}", other),
    }
    assert_eq!(game.abandon_player(0), Err(EngineError::MatchFinished));
}

#[test]
fn invalid_options_are_rejected() {
    let table = Table::new(vec!["a"], vec!["b"]).unwrap();
    let opts = MatchOptions {
        match_point: 0,
        ..MatchOptions::default()
    };
    let err = Match::new(table, opts, Random::from_seed(1, 2), Box::new(HashChain::new(1)))
        .unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}
