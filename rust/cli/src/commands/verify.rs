//! Verify command handler module.
//!
//! Checks JSONL hand records written by `truco sim`:
//!
//! - Valid hand IDs (format: YYYYMMDD-NNNNNN, real calendar date), no duplicates
//! - Every seat holds three cards and no card is dealt twice
//! - The hand has a winner and a finish reason
//! - The deal replays exactly from the revealed secret, client seeds and
//!   recorded proof
//!
//! Errors are collected with `BatchValidationError` so every bad record is
//! reported, not just the first.

use crate::error::{BatchValidationError, CliError};
use crate::io_utils::read_text;
use crate::ui;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::Write;
use truco_engine::logger::HandRecord;

/// The `usize` context is the 1-based line number.
type VerifyError = BatchValidationError<usize>;

fn valid_id(s: &str) -> bool {
    s.len() == 15
        && s.is_ascii()
        && NaiveDate::parse_from_str(&s[0..8], "%Y%m%d").is_ok()
        && &s[8..9] == "-"
        && s[9..].chars().all(|c| c.is_ascii_digit())
}

/// Problems with one record, empty when it verifies.
fn check_record(rec: &HandRecord, seen: &mut HashSet<String>) -> Vec<String> {
    let mut problems = Vec::new();
    if !valid_id(&rec.hand_id) {
        problems.push(format!("invalid hand_id {}", rec.hand_id));
    }
    if !seen.insert(rec.hand_id.clone()) {
        problems.push(format!("duplicate hand_id {}", rec.hand_id));
    }

    let mut cards = HashSet::new();
    for dealt in &rec.dealt {
        if dealt.cards.len() != 3 {
            problems.push(format!("seat {} holds {} cards", dealt.seat, dealt.cards.len()));
        }
        for card in &dealt.cards {
            if !cards.insert(*card) {
                problems.push(format!("card {} dealt twice", card));
            }
        }
    }

    if rec.winner.is_none() || rec.reason.is_none() {
        problems.push("hand has no winner".to_string());
    }

    match &rec.reveal {
        None => problems.push("missing reveal".to_string()),
        Some(reveal) => match rec.verify_deal(reveal) {
            Ok(true) => {}
            Ok(false) => problems.push("deal does not match proof".to_string()),
            Err(e) => problems.push(e.to_string()),
        },
    }
    problems
}

/// Handle the verify command.
///
/// Prints `Verified: N/M hands` and returns an error (exit code 2) when any
/// record fails.
///
/// # Example
///
/// ```no_run
/// # use std::io;
/// let code = truco_cli::run(["truco", "verify", "--input", "data/hands.jsonl"], &mut io::stdout(), &mut io::stderr());
/// ```
pub fn handle_verify_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = match read_text(&input) {
        Ok(c) => c,
        Err(e) => {
            ui::write_error(err, &e)?;
            return Err(CliError::InvalidInput(e));
        }
    };

    let mut errors: Vec<VerifyError> = Vec::new();
    let mut seen = HashSet::new();
    let mut hands = 0usize;
    let mut failed = 0usize;

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        hands += 1;
        let problems = match serde_json::from_str::<HandRecord>(line) {
            Ok(rec) => check_record(&rec, &mut seen),
            Err(e) => vec![format!("Invalid JSON record: {}", e)],
        };
        if !problems.is_empty() {
            failed += 1;
        }
        errors.extend(problems.into_iter().map(|message| VerifyError {
            item_context: i + 1,
            message,
        }));
    }

    if hands == 0 {
        ui::write_error(err, "no hand records found")?;
        return Err(CliError::InvalidInput(format!("{} has no hand records", input)));
    }

    writeln!(out, "Verified: {}/{} hands", hands - failed, hands)?;
    if errors.is_empty() {
        return Ok(());
    }
    for e in &errors {
        ui::write_error(err, &format!("line {}", e))?;
    }
    Err(CliError::InvalidInput(format!(
        "{} of {} hands failed verification",
        failed, hands
    )))
}
