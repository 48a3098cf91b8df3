//! Digest engine: SHA-2 hash functions as incremental state machines

use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported hash functions. Serde goes through [`FromStr`] and
/// [`name`](Self::name), so both paths accept the same names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Digest length in bytes
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Internal block size in bytes
    pub const fn block_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha384 | Self::Sha512 => 128,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SHA-256" | "SHA256" => Ok(Self::Sha256),
            "SHA-384" | "SHA384" => Ok(Self::Sha384),
            "SHA-512" | "SHA512" => Ok(Self::Sha512),
            _ => Err(CryptoError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = CryptoError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DigestAlgorithm> for &'static str {
    fn from(alg: DigestAlgorithm) -> Self {
        alg.name()
    }
}

/// Lifecycle of a digest or MAC computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fresh,
    Accumulating,
    Finalized,
}

/// Finished hash output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl Digest {
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

enum Hasher {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            DigestAlgorithm::Sha384 => Self::Sha384(Sha384::new()),
            DigestAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha384(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

/// Incremental hash computation.
///
/// `Fresh -> Accumulating -> Finalized`. Any call after `finalize` fails with
/// [`CryptoError::InvalidState`]. Single-owner: not meant to be shared between
/// threads while being updated.
pub struct DigestState {
    algorithm: DigestAlgorithm,
    phase: Phase,
    hasher: Option<Hasher>,
    bytes_processed: u64,
}

impl DigestState {
    pub fn init(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm,
            phase: Phase::Fresh,
            hasher: Some(Hasher::new(algorithm)),
            bytes_processed: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        let hasher = self.hasher.as_mut().ok_or(CryptoError::InvalidState)?;
        hasher.update(data);
        self.bytes_processed += data.len() as u64;
        self.phase = Phase::Accumulating;
        Ok(())
    }

    /// Produce the digest. Terminal: the state cannot be reused.
    pub fn finalize(&mut self) -> Result<Digest> {
        let hasher = self.hasher.take().ok_or(CryptoError::InvalidState)?;
        self.phase = Phase::Finalized;
        tracing::debug!(
            algorithm = %self.algorithm,
            bytes = self.bytes_processed,
            "digest finalized"
        );
        Ok(Digest {
            algorithm: self.algorithm,
            bytes: hasher.finalize(),
        })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Total bytes fed through `update` so far
    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }
}

impl fmt::Debug for DigestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestState")
            .field("algorithm", &self.algorithm)
            .field("phase", &self.phase)
            .field("bytes_processed", &self.bytes_processed)
            .finish()
    }
}

/// Hash `data` in one call
pub fn one_shot(algorithm: DigestAlgorithm, data: &[u8]) -> Digest {
    let mut hasher = Hasher::new(algorithm);
    hasher.update(data);
    Digest {
        algorithm,
        bytes: hasher.finalize(),
    }
}
