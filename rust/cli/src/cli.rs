//! Command-line argument definitions.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "truco", version, about = "Truco rules engine: bot simulations and fair-deal tools")]
pub struct TrucoCli {
    /// Log engine decisions to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run bot-vs-bot matches and record every hand as JSONL
    Sim {
        #[arg(long, default_value_t = 1)]
        matches: u32,
        /// Seats at the table: 2, 4 or 6
        #[arg(long, default_value_t = 2)]
        players: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "baseline")]
        bot: String,
        #[arg(long)]
        output: Option<String>,
    },
    /// Shuffle and deal one hand, printing the fairness proof
    Deal {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 2)]
        players: usize,
    },
    /// Recompute every recorded deal from its revealed seeds
    Verify {
        #[arg(long)]
        input: Option<String>,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}
