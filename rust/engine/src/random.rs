//! Commit-reveal randomness for the shuffle.
//!
//! The server secret is sampled once per table and only its SHA-256
//! commitment is published. Each seat contributes a client seed, and each hand
//! binds a public block hash. Every shuffle draw seeds a ChaCha20 generator
//! from `H(domain || client_seed || secret || block_hash || nonce)` with a
//! nonce that only ever grows, so nobody can steer the permutation alone and
//! anyone can replay it once the secret is revealed.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

const DOMAIN: &[u8] = b"TRUCO_FAIR_SHUFFLE_V1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FairnessError {
    #[error("revealed secret is not 32 bytes of hex")]
    InvalidSecret,
    #[error("revealed secret does not match commitment {0}")]
    CommitmentMismatch(String),
    #[error("no client seed for seat {0}")]
    UnknownSeat(usize),
}

/// Secret and client seeds disclosed for post-hoc verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub secret: String,
    pub client_seeds: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Random {
    secret: [u8; 32],
    client_seeds: Vec<String>,
    block_hash: String,
    nonce: u64,
}

impl Random {
    pub fn new(secret: [u8; 32], seats: usize) -> Self {
        Self {
            secret,
            client_seeds: vec![String::new(); seats],
            block_hash: String::new(),
            nonce: 0,
        }
    }

    /// Samples a fresh server secret from `rng`.
    pub fn generate<R: RngCore>(rng: &mut R, seats: usize) -> Self {
        let mut secret = [0u8; 32];
        rng.fill_bytes(&mut secret);
        Self::new(secret, seats)
    }

    /// Reproducible secret for simulations and tests.
    pub fn from_seed(seed: u64, seats: usize) -> Self {
        Self::generate(&mut ChaCha20Rng::seed_from_u64(seed), seats)
    }

    /// Hex SHA-256 of the secret, safe to publish before play.
    pub fn commitment(&self) -> String {
        commitment_of(&self.secret)
    }

    pub fn set_client_seed(
        &mut self,
        seat: usize,
        seed: impl Into<String>,
    ) -> Result<(), FairnessError> {
        let slot = self
            .client_seeds
            .get_mut(seat)
            .ok_or(FairnessError::UnknownSeat(seat))?;
        *slot = seed.into();
        Ok(())
    }

    pub fn client_seed(&self, seat: usize) -> Option<&str> {
        self.client_seeds.get(seat).map(String::as_str)
    }

    pub fn bind_block_hash(&mut self, hash: impl Into<String>) {
        self.block_hash = hash.into();
    }

    pub fn block_hash(&self) -> &str {
        &self.block_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Uniform index in `0..bound` for the given seat, consuming one nonce.
    pub fn pick(&mut self, seat: usize, bound: usize) -> Result<usize, FairnessError> {
        let client_seed = self
            .client_seeds
            .get(seat)
            .ok_or(FairnessError::UnknownSeat(seat))?;
        let v = draw(
            &self.secret,
            client_seed,
            &self.block_hash,
            self.nonce,
            bound,
        );
        self.nonce += 1;
        Ok(v)
    }

    pub fn reveal(&self) -> Reveal {
        Reveal {
            secret: hex::encode(self.secret),
            client_seeds: self.client_seeds.clone(),
        }
    }
}

pub fn commitment_of(secret: &[u8]) -> String {
    hex::encode(Sha256::digest(secret))
}

fn draw_seed(secret: &[u8], client_seed: &str, block_hash: &str, nonce: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN);
    // length prefixes keep field boundaries unambiguous
    hasher.update((client_seed.len() as u64).to_le_bytes());
    hasher.update(client_seed.as_bytes());
    hasher.update(secret);
    hasher.update((block_hash.len() as u64).to_le_bytes());
    hasher.update(block_hash.as_bytes());
    hasher.update(nonce.to_le_bytes());
    hasher.finalize().into()
}

pub(crate) fn draw(
    secret: &[u8],
    client_seed: &str,
    block_hash: &str,
    nonce: u64,
    bound: usize,
) -> usize {
    let mut rng = ChaCha20Rng::from_seed(draw_seed(secret, client_seed, block_hash, nonce));
    rng.random_range(0..bound)
}

/// Decodes a revealed secret, checking it against the published commitment.
pub fn decode_secret(reveal: &Reveal, commitment: &str) -> Result<[u8; 32], FairnessError> {
    let bytes = hex::decode(&reveal.secret).map_err(|_| FairnessError::InvalidSecret)?;
    let secret: [u8; 32] = bytes
        .try_into()
        .map_err(|_| FairnessError::InvalidSecret)?;
    if commitment_of(&secret) != commitment {
        return Err(FairnessError::CommitmentMismatch(commitment.to_string()));
    }
    Ok(secret)
}

/// Supplies the public block hash bound to each hand's shuffle.
///
/// Hosts back this with a real chain or beacon; the engine only asks for one
/// value per hand and never blocks on it.
pub trait EntropySource: Send {
    fn block_hash(&mut self, hand_idx: u32) -> String;
}

/// Deterministic hash chain: each hand gets `sha256(previous)`.
#[derive(Debug, Clone)]
pub struct HashChain {
    state: [u8; 32],
}

impl HashChain {
    pub fn new(seed: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"TRUCO_BLOCK_CHAIN_V1");
        hasher.update(seed.to_le_bytes());
        Self {
            state: hasher.finalize().into(),
        }
    }
}

impl EntropySource for HashChain {
    fn block_hash(&mut self, _hand_idx: u32) -> String {
        self.state = Sha256::digest(self.state).into();
        hex::encode(self.state)
    }
}
