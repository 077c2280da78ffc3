//! Command handler modules for the truco CLI.
//!
//! Each command lives in its own module with a consistent pattern:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Output streams (`&mut dyn Write`) passed as parameters
//! - Errors propagated via `CliError`

pub mod cfg;
pub mod deal;
pub mod sim;
pub mod verify;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use sim::{SimArgs, handle_sim_command};
pub use verify::handle_verify_command;

use crate::error::CliError;
use truco_engine::table::Table;

/// Seats `players` anonymous players, alternating teams.
pub(crate) fn seat_table(players: usize) -> Result<Table, CliError> {
    if !matches!(players, 2 | 4 | 6) {
        return Err(CliError::InvalidInput(format!(
            "players must be 2, 4 or 6, got {}",
            players
        )));
    }
    let per_team = players / 2;
    let team = |t: usize| -> Vec<String> {
        (0..per_team).map(|i| format!("seat{}", i * 2 + t)).collect()
    };
    Ok(Table::new(team(0), team(1))?)
}
