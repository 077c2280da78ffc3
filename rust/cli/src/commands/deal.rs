//! Deal command handler for a single provably-fair deal.
//!
//! Shuffles with a seeded server secret, deals one hand and prints every
//! seat's cards with their envido and flor values, followed by the proof and
//! the revealed secret so the deal can be checked by hand.

use crate::commands::seat_table;
use crate::error::CliError;
use crate::ui::format_cards;
use std::io::Write;
use truco_engine::deck::{verify_shuffle, Deck};
use truco_engine::hand::Hand;
use truco_engine::options::MatchOptions;
use truco_engine::random::{EntropySource, HashChain, Random};

/// Handle the deal command.
///
/// The same seed always produces the same output.
pub fn handle_deal_command(
    seed: Option<u64>,
    players: usize,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(rand::random);
    let mut table = seat_table(players)?;
    let mut deck = Deck::new(Random::from_seed(seed, players));
    let block_hash = HashChain::new(seed).block_hash(0);
    let hand = Hand::new(0, &mut table, &mut deck, &block_hash, MatchOptions::default(), 0)?;
    let summary = hand.summary();

    writeln!(out, "Seed: {}", seed)?;
    for dealt in &summary.dealt {
        let player = table.player(dealt.seat)?;
        let flor = match player.flor_points() {
            Some(points) => format!("  flor {}", points),
            None => String::new(),
        };
        writeln!(
            out,
            "Seat {} (team {}): {}  envido {}{}",
            dealt.seat,
            dealt.seat % 2,
            format_cards(&dealt.cards),
            player.envido_points(),
            flor
        )?;
    }
    writeln!(out, "Commitment: {}", summary.proof.commitment)?;
    writeln!(out, "Block hash: {}", summary.proof.block_hash)?;
    writeln!(out, "Nonce: {}", summary.proof.start_nonce)?;

    let reveal = deck.random().reveal();
    let replayed = verify_shuffle(&reveal, &summary.proof)?;
    writeln!(out, "Secret: {}", reveal.secret)?;
    writeln!(out, "Replayed deck: {}", format_cards(&replayed))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_command_deterministic() {
        let mut out1: Vec<u8> = Vec::new();
        let mut out2: Vec<u8> = Vec::new();

        handle_deal_command(Some(12345), 2, &mut out1).unwrap();
        handle_deal_command(Some(12345), 2, &mut out2).unwrap();

        assert_eq!(out1, out2, "Same seed should produce identical output");
    }

    #[test]
    fn test_deal_command_prints_every_seat() {
        let mut out: Vec<u8> = Vec::new();
        handle_deal_command(Some(7), 6, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();
        for seat in 0..6 {
            assert!(output.contains(&format!("Seat {} ", seat)), "missing seat {}", seat);
        }
        assert!(output.contains("Commitment: "));
        assert!(output.contains("Secret: "));
    }

    #[test]
    fn test_deal_command_rejects_odd_tables() {
        let mut out: Vec<u8> = Vec::new();
        assert!(handle_deal_command(Some(1), 3, &mut out).is_err());
    }
}
