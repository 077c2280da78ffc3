//! Simulation command handler: bot-vs-bot matches.
//!
//! Each match runs through the engine's async game loop with one bot per
//! seat. Finished hands are written as JSONL [`HandRecord`]s once the match
//! is over, with the revealed seeds attached so `truco verify` can replay
//! every deal.
//!
//! # Environment Variables
//!
//! - `TRUCO_SIM_BREAK_AFTER`: stop after N matches as if interrupted (for testing)

use crate::commands::seat_table;
use crate::config::Config;
use crate::error::CliError;
use crate::io_utils::ensure_parent_dir;
use crate::ui;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use truco_ai::{create_bot, BotStrategy, BotTable};
use truco_engine::game::Match;
use truco_engine::game_loop::GameLoop;
use truco_engine::logger::{HandLogger, HandRecord};
use truco_engine::random::{HashChain, Random};
use truco_engine::team::TeamPoints;

/// Arguments of the sim command.
#[derive(Debug, Clone)]
pub struct SimArgs {
    pub matches: u32,
    pub players: usize,
    pub seed: Option<u64>,
    pub bot: String,
    pub output: Option<String>,
}

/// Handle the sim command.
///
/// Match `m` uses seed `seed + m`, so any single match can be replayed on
/// its own. Prints a summary line with the wins per team.
pub fn handle_sim_command(
    args: SimArgs,
    config: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if args.matches == 0 {
        ui::write_error(err, "matches must be >= 1")?;
        return Err(CliError::InvalidInput("matches must be >= 1".to_string()));
    }
    // Validate the bot name before any work is done.
    create_bot(&args.bot, 0)?;

    let base_seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    let options = config.match_options();

    let mut logger = match &args.output {
        Some(p) => {
            let path = PathBuf::from(p);
            if let Err(e) = ensure_parent_dir(&path) {
                ui::write_error(err, &e)?;
                return Err(CliError::Io(std::io::Error::other(e)));
            }
            HandLogger::create(&path)?
        }
        None => HandLogger::detached(&chrono::Utc::now().format("%Y%m%d").to_string()),
    };

    let break_after = std::env::var("TRUCO_SIM_BREAK_AFTER")
        .ok()
        .and_then(|v| v.parse::<u32>().ok());

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let mut wins = [0u32; 2];
    let mut hands = 0usize;

    for m in 0..args.matches {
        if break_after.is_some_and(|n| m >= n) {
            writeln!(out, "Interrupted after {} matches", m)?;
            return Err(CliError::Interrupted(format!("stopped after {} matches", m)));
        }
        let seed = base_seed.wrapping_add(u64::from(m));
        let table = seat_table(args.players)?;
        let game = Match::new(
            table,
            options.clone(),
            Random::from_seed(seed, args.players),
            Box::new(HashChain::new(seed)),
        )?;
        let bots = (0..args.players)
            .map(|seat| create_bot(&args.bot, seed.wrapping_mul(31).wrapping_add(seat as u64)))
            .collect::<Result<Vec<Box<dyn BotStrategy>>, _>>()?;

        let mut game_loop = GameLoop::new(game, BotTable::new(bots));
        let result = runtime.block_on(game_loop.begin())?;
        let (game, mut bots) = game_loop.into_parts();
        let reveal = game.reveal();

        let mut scores = [TeamPoints::default(); 2];
        for summary in bots.take_finished() {
            for (team, score) in scores.iter_mut().enumerate() {
                *score = score.with_points(summary.points.total(team), options.match_point);
            }
            let mut rec = HandRecord::from_summary(logger.next_id(), Some(seed), &summary, scores);
            rec.reveal = reveal.clone();
            rec.meta = Some(serde_json::json!({ "match": m, "bot": args.bot.as_str() }));
            logger.write(&rec)?;
            hands += 1;
        }

        if result.aborted {
            ui::display_warning(err, &format!("match {} aborted after handler failures", m))?;
        }
        wins[result.winner] += 1;
        info!(
            match_idx = m,
            winner = result.winner,
            hands = result.hands,
            aborted = result.aborted,
            "simulated match"
        );
    }

    writeln!(
        out,
        "Simulated: {} matches, {} hands (team 0: {} wins, team 1: {} wins)",
        args.matches, hands, wins[0], wins[1]
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(matches: u32, bot: &str) -> SimArgs {
        SimArgs {
            matches,
            players: 2,
            seed: Some(3),
            bot: bot.to_string(),
            output: None,
        }
    }

    #[test]
    fn rejects_zero_matches() {
        let (mut out, mut err): (Vec<u8>, Vec<u8>) = (Vec::new(), Vec::new());
        let res = handle_sim_command(args(0, "baseline"), &Config::default(), &mut out, &mut err);
        assert!(matches!(res, Err(CliError::InvalidInput(_))));
        assert!(String::from_utf8(err).unwrap().contains("matches must be >= 1"));
    }

    #[test]
    fn rejects_unknown_bot() {
        let (mut out, mut err): (Vec<u8>, Vec<u8>) = (Vec::new(), Vec::new());
        let res = handle_sim_command(args(1, "oracle"), &Config::default(), &mut out, &mut err);
        assert!(matches!(res, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn summary_counts_every_match() {
        let (mut out, mut err): (Vec<u8>, Vec<u8>) = (Vec::new(), Vec::new());
        let config = Config {
            match_point: 5,
            ..Config::default()
        };
        handle_sim_command(args(3, "random"), &config, &mut out, &mut err).unwrap();
        let stdout = String::from_utf8(out).unwrap();
        assert!(stdout.starts_with("Simulated: 3 matches"), "{}", stdout);
    }
}
