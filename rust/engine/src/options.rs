use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How the falta envido stake is computed while the leading team is still
/// in malas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaltaEnvido {
    /// Pays what the leader lacks to leave malas.
    Single,
    /// Pays the whole match.
    Double,
}

/// What the game loop does when a decision handler returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HandlerPolicy {
    /// Re-offer the same decision point up to `attempts` more times, then
    /// abort the match.
    Retry { attempts: u8 },
    /// Abort the match on the first failure.
    Abort,
}

/// Per-match options, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Points needed in malas and then again in buenas.
    pub match_point: u8,
    pub falta_envido: FaltaEnvido,
    pub flor: bool,
    /// Seconds a host may wait for a decision before forcing a fold.
    pub turn_timeout_secs: u64,
    /// Seconds a disconnected seat is kept before it counts as abandoned.
    pub abandon_timeout_secs: u64,
    pub handler_policy: HandlerPolicy,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            match_point: 15,
            falta_envido: FaltaEnvido::Double,
            flor: true,
            turn_timeout_secs: 30,
            abandon_timeout_secs: 120,
            handler_policy: HandlerPolicy::Retry { attempts: 3 },
        }
    }
}

impl MatchOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.match_point == 0 || self.match_point > 30 {
            return Err(ConfigError::MatchPoint(self.match_point));
        }
        if self.turn_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("turn_timeout_secs"));
        }
        if self.abandon_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("abandon_timeout_secs"));
        }
        if let HandlerPolicy::Retry { attempts } = self.handler_policy {
            if attempts > 10 {
                return Err(ConfigError::RetryAttempts(attempts));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MatchOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_match_point() {
        let opts = MatchOptions {
            match_point: 0,
            ..MatchOptions::default()
        };
        assert_eq!(opts.validate(), Err(ConfigError::MatchPoint(0)));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let opts: MatchOptions =
            serde_json::from_str(r#"{"match_point": 9, "falta_envido": "single"}"#).unwrap();
        assert_eq!(opts.match_point, 9);
        assert_eq!(opts.falta_envido, FaltaEnvido::Single);
        assert!(opts.flor);
        assert_eq!(opts.handler_policy, HandlerPolicy::Retry { attempts: 3 });
    }
}
