use serde::{Deserialize, Serialize};

use crate::deck::{verify_shuffle, ShuffleProof};
use crate::hand::{ActionRecord, DealtHand, FinishReason, HandPoints, HandSummary};
use crate::player::{TeamIdx, HAND_SIZE};
use crate::random::{FairnessError, Reveal};
use crate::round::Play;
use crate::team::TeamPoints;

/// One finished hand, serialized as a JSONL line for history and replay.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Unique identifier for this hand (format: YYYYMMDD-NNNNNN)
    pub hand_id: String,
    /// Seed of the simulation that produced the hand, if any
    pub seed: Option<u64>,
    pub hand_idx: u32,
    pub forehand: usize,
    pub proof: ShuffleProof,
    /// Cards per seat in dealing order
    pub dealt: Vec<DealtHand>,
    pub tricks: Vec<Vec<Play>>,
    pub actions: Vec<ActionRecord>,
    pub points: HandPoints,
    pub winner: Option<TeamIdx>,
    pub reason: Option<FinishReason>,
    /// Score after the hand was applied
    pub scores: [TeamPoints; 2],
    /// Secret and client seeds, filled in once the match is over
    #[serde(default)]
    pub reveal: Option<Reveal>,
    /// Timestamp when the hand was logged (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl HandRecord {
    pub fn from_summary(
        hand_id: String,
        seed: Option<u64>,
        summary: &HandSummary,
        scores: [TeamPoints; 2],
    ) -> Self {
        Self {
            hand_id,
            seed,
            hand_idx: summary.idx,
            forehand: summary.forehand,
            proof: summary.proof.clone(),
            dealt: summary.dealt.clone(),
            tricks: summary.tricks.clone(),
            actions: summary.actions.clone(),
            points: summary.points,
            winner: summary.winner,
            reason: summary.reason,
            scores,
            reveal: None,
            ts: None,
            meta: None,
        }
    }

    /// Replays the shuffle from `reveal` and checks that every seat got the
    /// cards recorded for it. Cards go out one at a time, forehand first.
    pub fn verify_deal(&self, reveal: &Reveal) -> Result<bool, FairnessError> {
        let deck = verify_shuffle(reveal, &self.proof)?;
        let n = self.dealt.len();
        let ok = self.dealt.iter().enumerate().all(|(i, d)| {
            d.cards.len() == HAND_SIZE
                && d
                    .cards
                    .iter()
                    .enumerate()
                    .all(|(pass, c)| deck.get(pass * n + i) == Some(c))
        });
        Ok(ok)
    }
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct HandLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Logger that only hands out ids.
    pub fn detached(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
