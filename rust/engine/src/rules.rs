use std::collections::BTreeSet;

use crate::commands::{Command, CommandMap};
use crate::hand::{Hand, HandState};
use crate::player::{Player, TeamIdx};
use crate::table::Table;

/// Whether `seat` still has to declare its flor.
///
/// A pending flor outranks every other call: the holder may say FLOR or
/// play a card, which declares the flor on the way.
pub fn flor_pending(hand: &Hand, table: &Table, seat: usize) -> bool {
    let Ok(p) = table.player(seat) else {
        return false;
    };
    hand.options().flor
        && p.is_active()
        && p.has_flor()
        && !p.has_said_flor
        && !hand.flor().is_finished()
        && hand.is_first_trick()
        && p.used_hand().is_empty()
}

/// Whether `seat` may open the envido: first trick, before playing, with no
/// envido or flor called and no truco accepted yet. Flor holders declare
/// flor instead when flor is enabled.
pub fn can_open_envido(hand: &Hand, table: &Table, seat: usize) -> bool {
    let Ok(p) = table.player(seat) else {
        return false;
    };
    hand.is_first_trick()
        && !hand.round().has_played(seat)
        && !hand.envido().is_started()
        && !hand.flor().is_started()
        && hand.truco().value() == crate::truco::BASE_VALUE
        && !(hand.options().flor && p.has_flor())
}

/// Legal commands for every active seat at the hand's current decision
/// point. Seats with nothing to say are left out.
///
/// Precedence is flor, then envido, then truco and folding, then card play:
/// a seat with a pending flor is offered only FLOR, an open envido or flor
/// must be settled before the truco answer resumes.
pub fn legal_commands(hand: &Hand, table: &Table) -> CommandMap {
    let mut map = CommandMap::new();
    let state = hand.state();
    let current = hand.current_seat(table);
    for seat in table.forehand_first() {
        let Ok(player) = table.player(seat) else {
            continue;
        };
        if !player.is_active() {
            continue;
        }
        let mut set = BTreeSet::new();
        match state {
            HandState::WaitingFlorAnswer => flor_answer(hand, player, &mut set),
            HandState::WaitingPlay
            | HandState::WaitingForTrucoAnswer
            | HandState::WaitingEnvidoAnswer
            | HandState::WaitingEnvidoPointsAnswer
                if flor_pending(hand, table, seat) =>
            {
                set.insert(Command::Flor);
            }
            HandState::WaitingPlay if current == Some(seat) => {
                if can_open_envido(hand, table, seat) {
                    set.extend([Command::Envido, Command::RealEnvido, Command::FaltaEnvido]);
                }
                if hand.truco().can_raise(player.team) {
                    set.extend(hand.truco().next_command());
                }
                set.insert(Command::MeVoyAlMazo);
            }
            HandState::WaitingForTrucoAnswer
                if hand.truco().answering_team() == Some(player.team) =>
            {
                set.extend([Command::Quiero, Command::NoQuiero]);
                if hand.truco().can_raise(player.team) {
                    set.extend(hand.truco().next_command());
                }
                // The envido goes first: it can still be called over the
                // first TRUCO.
                if hand.truco().rung() == 2 && can_open_envido(hand, table, seat) {
                    set.extend([Command::Envido, Command::RealEnvido, Command::FaltaEnvido]);
                }
            }
            HandState::WaitingEnvidoAnswer
                if hand.envido().answering_team() == Some(player.team) =>
            {
                set.extend([Command::Quiero, Command::NoQuiero]);
                set.extend(hand.envido().possible_raises());
            }
            HandState::WaitingEnvidoPointsAnswer
                if current == Some(seat) && !hand.envido().declarations().is_empty() =>
            {
                set.insert(Command::SonBuenas);
            }
            _ => {}
        }
        if !set.is_empty() {
            map.insert(seat, set);
        }
    }
    map
}

fn flor_answer(hand: &Hand, player: &Player, set: &mut BTreeSet<Command>) {
    if !hand.options().flor || !player.has_flor() {
        return;
    }
    let flor = hand.flor();
    if flor.answering_team() == Some(player.team) {
        set.extend([Command::Quiero, Command::NoQuiero]);
        set.extend(flor.possible_raises());
    } else if !player.has_said_flor && !flor.has_declared(player.seat) {
        set.insert(Command::Flor);
    }
}

/// Team that takes the hand from the tricks played so far, `None` while
/// undecided. `tricks[i]` is `None` for a tied trick.
///
/// Two tricks win outright. A tied first trick is decided by the next
/// decisive trick; a later tie goes to the winner of the first trick. Three
/// tied tricks go to the forehand's team.
///
/// ```
/// use truco_engine::rules::hand_winner;
///
/// assert_eq!(hand_winner(&[Some(0), Some(0)], 1), Some(0));
/// assert_eq!(hand_winner(&[None, Some(1)], 0), Some(1));
/// assert_eq!(hand_winner(&[Some(0), None], 1), Some(0));
/// assert_eq!(hand_winner(&[Some(0), Some(1)], 1), None);
/// assert_eq!(hand_winner(&[None, None, None], 1), Some(1));
/// ```
pub fn hand_winner(tricks: &[Option<TeamIdx>], forehand_team: TeamIdx) -> Option<TeamIdx> {
    for team in 0..2 {
        if tricks.iter().filter(|&&t| t == Some(team)).count() >= 2 {
            return Some(team);
        }
    }
    match tricks {
        [None, rest @ ..] => rest
            .iter()
            .flatten()
            .next()
            .copied()
            .or_else(|| (tricks.len() >= 3).then_some(forehand_team)),
        [Some(first), rest @ ..] if rest.iter().any(Option::is_none) => Some(*first),
        _ if tricks.len() >= 3 => Some(forehand_team),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undecided_after_one_trick() {
        assert_eq!(hand_winner(&[Some(1)], 0), None);
        assert_eq!(hand_winner(&[None], 0), None);
        assert_eq!(hand_winner(&[None, None], 0), None);
    }

    #[test]
    fn third_trick_decides_split() {
        assert_eq!(hand_winner(&[Some(1), Some(0), Some(1)], 0), Some(1));
        assert_eq!(hand_winner(&[Some(1), Some(0), None], 0), Some(1));
        assert_eq!(hand_winner(&[None, None, Some(0)], 1), Some(0));
    }
}
