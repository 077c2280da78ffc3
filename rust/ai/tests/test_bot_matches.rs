use truco_ai::{create_bot, BotStrategy, BotTable, UnknownBot};
use truco_engine::game::Match;
use truco_engine::game_loop::GameLoop;
use truco_engine::options::MatchOptions;
use truco_engine::random::{HashChain, Random};
use truco_engine::table::Table;

fn new_match(seed: u64, per_team: usize) -> Match {
    let team0: Vec<String> = (0..per_team).map(|i| format!("a{}", i)).collect();
    let team1: Vec<String> = (0..per_team).map(|i| format!("b{}", i)).collect();
    let opts = MatchOptions {
        match_point: 9,
        ..MatchOptions::default()
    };
    Match::new(
        Table::new(team0, team1).unwrap(),
        opts,
        Random::from_seed(seed, per_team * 2),
        Box::new(HashChain::new(seed)),
    )
    .unwrap()
}

fn bots(name: &str, seats: usize, seed: u64) -> BotTable {
    let bots: Vec<Box<dyn BotStrategy>> = (0..seats)
        .map(|s| create_bot(name, seed + s as u64).unwrap())
        .collect();
    BotTable::new(bots)
}

#[tokio::test]
async fn baseline_bots_finish_every_table_size() {
    for per_team in 1..=3 {
        let mut game_loop = GameLoop::new(new_match(100 + per_team as u64, per_team), bots("baseline", per_team * 2, 0));
        let result = game_loop.begin().await.expect("match result");
        assert!(!result.aborted, "bots never submit illegal actions");
        assert!(result.scores[result.winner].winner);
        let (_, table) = game_loop.into_parts();
        assert_eq!(table.finished().len() as u32, result.hands);
        assert_eq!(table.result(), Some(&result));
    }
}

#[tokio::test]
async fn random_bots_finish_and_replay_identically() {
    let mut first = GameLoop::new(new_match(5, 2), bots("random", 4, 77));
    let a = first.begin().await.expect("first run");
    let mut second = GameLoop::new(new_match(5, 2), bots("random", 4, 77));
    let b = second.begin().await.expect("second run");
    assert_eq!(a, b);
    let (_, ta) = first.into_parts();
    let (_, tb) = second.into_parts();
    assert_eq!(ta.finished(), tb.finished());
}

#[tokio::test]
async fn mixed_bots_play_each_other() {
    let table = BotTable::new(vec![
        create_bot("baseline", 0).unwrap(),
        create_bot("random", 9).unwrap(),
    ]);
    let mut game_loop = GameLoop::new(new_match(31, 1), table);
    let result = game_loop.begin().await.expect("match result");
    assert!(!result.aborted);
}

#[test]
fn unknown_bot_is_an_error() {
    let err = create_bot("oracle", 0).err().expect("unknown bot");
    assert_eq!(err, UnknownBot("oracle".to_string()));
    assert!(err.to_string().contains("oracle"));
}
