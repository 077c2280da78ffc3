use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Spoken commands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Flor,
    Contraflor,
    ContraflorAlResto,
    Envido,
    RealEnvido,
    FaltaEnvido,
    Truco,
    ReTruco,
    ValeCuatro,
    Quiero,
    NoQuiero,
    SonBuenas,
    MeVoyAlMazo,
}

impl Command {
    pub fn is_truco(self) -> bool {
        matches!(self, Command::Truco | Command::ReTruco | Command::ValeCuatro)
    }

    pub fn is_envido(self) -> bool {
        matches!(
            self,
            Command::Envido | Command::RealEnvido | Command::FaltaEnvido
        )
    }

    pub fn is_flor_raise(self) -> bool {
        matches!(self, Command::Contraflor | Command::ContraflorAlResto)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Command::Flor => "FLOR",
            Command::Contraflor => "CONTRAFLOR",
            Command::ContraflorAlResto => "CONTRAFLOR_AL_RESTO",
            Command::Envido => "ENVIDO",
            Command::RealEnvido => "REAL_ENVIDO",
            Command::FaltaEnvido => "FALTA_ENVIDO",
            Command::Truco => "TRUCO",
            Command::ReTruco => "RE_TRUCO",
            Command::ValeCuatro => "VALE_CUATRO",
            Command::Quiero => "QUIERO",
            Command::NoQuiero => "NO_QUIERO",
            Command::SonBuenas => "SON_BUENAS",
            Command::MeVoyAlMazo => "ME_VOY_AL_MAZO",
        };
        f.write_str(s)
    }
}

/// Something a player says: a command or an envido number.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Say {
    Command(Command),
    Points(u8),
}

impl From<Command> for Say {
    fn from(c: Command) -> Self {
        Say::Command(c)
    }
}

/// Legal commands per seat at one decision point.
pub type CommandMap = BTreeMap<usize, BTreeSet<Command>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ActionKind {
    /// Play the card at `card_idx` face up.
    Play { card_idx: usize, card: Card },
    /// Play the card at `card_idx` face down.
    Burn { card_idx: usize, card: Card },
    Say { say: Say },
}

/// A decision submitted for a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub seat: usize,
    pub kind: ActionKind,
}

impl Action {
    pub fn play(seat: usize, card_idx: usize, card: Card) -> Self {
        Self {
            seat,
            kind: ActionKind::Play { card_idx, card },
        }
    }

    pub fn burn(seat: usize, card_idx: usize, card: Card) -> Self {
        Self {
            seat,
            kind: ActionKind::Burn { card_idx, card },
        }
    }

    pub fn say(seat: usize, say: impl Into<Say>) -> Self {
        Self {
            seat,
            kind: ActionKind::Say { say: say.into() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_in_screaming_case() {
        let s = serde_json::to_string(&Command::ContraflorAlResto).unwrap();
        assert_eq!(s, "\"CONTRAFLOR_AL_RESTO\"");
        assert_eq!(Command::ReTruco.to_string(), "RE_TRUCO");
    }

    #[test]
    fn action_json_shape() {
        let a = Action::say(2, Command::Quiero);
        let v = serde_json::to_value(a).unwrap();
        assert_eq!(v["seat"], 2);
        assert_eq!(v["kind"]["type"], "say");
        assert_eq!(v["kind"]["say"]["command"], "QUIERO");
    }
}
