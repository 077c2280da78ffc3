//! # Truco CLI Library
//!
//! Command-line front end for the Truco engine: bot simulations that write
//! JSONL hand histories, single fair deals, and post-hoc deal verification.
//!
//! ## Main Entry Point
//!
//! [`run`] parses the arguments and executes the subcommand, writing to the
//! given streams and returning the process exit code.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["truco", "sim", "--matches", "10", "--output", "data/hands.jsonl"];
//! let code = truco_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `sim`: Bot-vs-bot matches recorded as JSONL
//! - `deal`: Deal a single hand with its fairness proof
//! - `verify`: Replay recorded deals from their revealed seeds
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod io_utils;
pub mod logging;
pub mod ui;

use cli::{Commands, TrucoCli};
use commands::{
    SimArgs, handle_cfg_command, handle_deal_command, handle_sim_command, handle_verify_command,
};

pub use error::{BatchValidationError, CliError};

const COMMANDS: &[&str] = &["sim", "deal", "verify", "cfg"];

/// Main entry point for the CLI application.
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors, `130` for interruptions
///
/// # Example
///
/// ```
/// use std::io;
/// let args = vec!["truco", "deal", "--seed", "42"];
/// let code = truco_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match TrucoCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return usage_error(e, out, err),
    };
    logging::init_logging(cli.verbose);

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Deal { seed, players } => {
            let seed = match seed_or_config(seed, err) {
                Ok(s) => s,
                Err(code) => return code,
            };
            handle_deal_command(seed, players, out)
        }
        Commands::Verify { input } => {
            let Some(path) = input else {
                let _ = ui::write_error(err, "input required");
                return exit_code::ERROR;
            };
            handle_verify_command(path, out, err)
        }
        Commands::Sim {
            matches,
            players,
            seed,
            bot,
            output,
        } => match config::load() {
            Ok(cfg) => {
                let args = SimArgs {
                    matches,
                    players,
                    seed,
                    bot,
                    output,
                };
                handle_sim_command(args, &cfg, out, err)
            }
            Err(e) => Err(e.into()),
        },
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(_)) => exit_code::INTERRUPTED,
        Err(e) => {
            if writeln!(err, "Error: {}", e).is_err() {
                return exit_code::ERROR;
            }
            exit_code::ERROR
        }
    }
}

/// Explicit seed first, then the configured one.
fn seed_or_config(seed: Option<u64>, err: &mut dyn Write) -> Result<Option<u64>, i32> {
    if seed.is_some() {
        return Ok(seed);
    }
    match config::load() {
        Ok(cfg) => Ok(cfg.seed),
        Err(e) => {
            let _ = ui::write_error(err, &format!("Invalid configuration: {}", e));
            Err(exit_code::ERROR)
        }
    }
}

fn usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version go to stdout with success.
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        if write!(out, "{}", e).is_err() {
            return exit_code::ERROR;
        }
        return exit_code::SUCCESS;
    }
    if writeln!(err, "{}", e).is_err()
        || writeln!(err).is_err()
        || writeln!(err, "Truco CLI").is_err()
        || writeln!(err, "Usage: truco <command> [options]\n").is_err()
        || writeln!(err, "Commands:").is_err()
    {
        return exit_code::ERROR;
    }
    for c in COMMANDS {
        if writeln!(err, "  {}", c).is_err() {
            return exit_code::ERROR;
        }
    }
    if writeln!(err, "\nFor full help, run: truco --help").is_err() {
        return exit_code::ERROR;
    }
    exit_code::ERROR
}
