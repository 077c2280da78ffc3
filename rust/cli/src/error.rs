//! Errors surfaced by the `truco` commands.
//!
//! Every handler returns [`CliError`]; [`crate::run`] maps it to an exit code
//! and prints it once. [`BatchValidationError`] carries one failed hand
//! record so `verify` can report all of them before failing.

use std::fmt;

use truco_ai::UnknownBot;
use truco_engine::errors::EngineError;
use truco_engine::random::FairnessError;

use crate::config::ConfigError;

#[derive(Debug)]
pub enum CliError {
    /// Reading records, writing the JSONL output or the console failed.
    Io(std::io::Error),
    /// Bad flag values, unknown bot names, records that fail verification.
    InvalidInput(String),
    Config(ConfigError),
    /// The engine refused a table or an action.
    Engine(EngineError),
    /// A deal could not be replayed from its proof.
    Fairness(FairnessError),
    /// Simulation stopped early; mapped to exit code 130.
    Interrupted(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Engine(e) => write!(f, "Engine error: {}", e),
            CliError::Fairness(e) => write!(f, "Fairness check failed: {}", e),
            CliError::Interrupted(msg) => write!(f, "Interrupted: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Engine(e) => Some(e),
            CliError::Fairness(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<EngineError> for CliError {
    fn from(error: EngineError) -> Self {
        CliError::Engine(error)
    }
}

impl From<FairnessError> for CliError {
    fn from(error: FairnessError) -> Self {
        CliError::Fairness(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error)
    }
}

impl From<UnknownBot> for CliError {
    fn from(error: UnknownBot) -> Self {
        CliError::InvalidInput(error.to_string())
    }
}

/// One rejected item of a batch, tagged with where it came from.
///
/// ```rust
/// use truco_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: 5,
///     message: "deal does not match proof".to_string(),
/// };
/// assert_eq!(error.to_string(), "5: deal does not match proof");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    pub item_context: T,
    pub message: String,
}

impl<T: fmt::Display> fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn hand_id_context_prefixes_message() {
        let error = BatchValidationError {
            item_context: "20260101-000001".to_string(),
            message: "missing reveal".to_string(),
        };
        assert_eq!(error.to_string(), "20260101-000001: missing reveal");
    }

    #[test]
    fn engine_errors_keep_their_source() {
        let e: CliError = EngineError::MatchFinished.into();
        assert_eq!(e.to_string(), "Engine error: Match already finished");
        assert!(e.source().is_some());
    }

    #[test]
    fn unknown_bots_are_input_errors() {
        let e: CliError = UnknownBot("oracle".into()).into();
        assert!(matches!(e, CliError::InvalidInput(_)));
    }
}
