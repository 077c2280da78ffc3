use std::fs;
use std::path::PathBuf;

use truco_engine::game::{Match, MatchStep};
use truco_engine::hand::HandSummary;
use truco_engine::logger::{format_hand_id, HandLogger, HandRecord};
use truco_engine::options::MatchOptions;
use truco_engine::random::{HashChain, Random};
use truco_engine::table::Table;

fn tmp_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("target");
    p.push(format!("{}_{}.jsonl", name, std::process::id()));
    p
}

/// Plays the first legal action until one hand is over, then ends the match
/// so the seeds can be revealed.
fn one_hand(seed: u64) -> (Match, HandSummary) {
    let table = Table::new(vec!["a"], vec!["b"]).unwrap();
    let mut game = Match::new(
        table,
        MatchOptions::default(),
        Random::from_seed(seed, 2),
        Box::new(HashChain::new(seed)),
    )
    .unwrap();
    loop {
        match game.play().unwrap() {
            MatchStep::Decision(p) => {
                let action = p.legal_actions()[0];
                game.act(p.decision_id, action).unwrap();
            }
            MatchStep::FlorBattle(_) => {}
            MatchStep::HandFinished(s) => {
                game.force_winner(0);
                return (game, s);
            }
            MatchStep::MatchFinished(r) => panic!("match ended early: {:?}", r),
        }
    }
}

#[test]
fn writes_jsonl_with_lf_only() {
    let (game, summary) = one_hand(11);
    let path = tmp_path("trucolog");
    let mut logger = HandLogger::create(&path).expect("create logger");
    let rec = HandRecord::from_summary(logger.next_id(), Some(11), &summary, game.scores());
    logger.write(&rec).expect("write");
    let bytes = fs::read(&path).expect("read file");
    assert!(bytes.ends_with(b"\n"));
    assert!(!bytes.contains(&b'\r'));
    let _ = fs::remove_file(&path);
}

#[test]
fn ts_is_generated_when_missing_and_preserved_when_present() {
    let (game, summary) = one_hand(12);
    let path = tmp_path("trucolog_ts");
    let mut logger = HandLogger::create(&path).expect("create logger");
    let rec = HandRecord::from_summary("20260101-000001".into(), None, &summary, game.scores());
    logger.write(&rec).expect("write");
    let line = fs::read_to_string(&path).unwrap();
    assert!(line.contains("\"ts\":"), "ts should be injected");

    let preset = "2030-01-01T00:00:00Z".to_string();
    let rec2 = HandRecord {
        ts: Some(preset.clone()),
        ..rec
    };
    logger.write(&rec2).expect("write2");
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(&preset), "preset ts must be kept");
    assert_eq!(content.lines().count(), 2);
    let _ = fs::remove_file(&path);
}

#[test]
fn record_reads_back_and_verifies() {
    let (game, summary) = one_hand(13);
    let mut rec = HandRecord::from_summary(format_hand_id("20260101", 1), Some(13), &summary, game.scores());
    rec.reveal = game.reveal();
    let s = serde_json::to_string(&rec).expect("serialize");
    let back: HandRecord = serde_json::from_str(&s).expect("deserialize");
    assert_eq!(rec, back);
    let reveal = back.reveal.clone().expect("reveal stored");
    assert!(back.verify_deal(&reveal).unwrap());
}

#[test]
fn swapped_cards_fail_verification() {
    let (game, summary) = one_hand(14);
    let mut rec = HandRecord::from_summary("x".into(), None, &summary, game.scores());
    let reveal = game.reveal().expect("match over");
    let a = rec.dealt[0].cards[0];
    rec.dealt[0].cards[0] = rec.dealt[1].cards[0];
    rec.dealt[1].cards[0] = a;
    assert!(!rec.verify_deal(&reveal).unwrap());
}

#[test]
fn id_format_is_date_and_sequence() {
    assert_eq!(format_hand_id("20251231", 42), "20251231-000042");
}
