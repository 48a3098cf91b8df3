//! HMAC engine over the SHA-2 digests

use crate::crypto::digest::{DigestAlgorithm, Phase};
use crate::crypto::keys::KeyMaterial;
use crate::error::{CryptoError, Result};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

/// Supported MAC algorithms, named as in JWS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum MacAlgorithm {
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl MacAlgorithm {
    pub const fn digest(self) -> DigestAlgorithm {
        match self {
            Self::HmacSha256 => DigestAlgorithm::Sha256,
            Self::HmacSha384 => DigestAlgorithm::Sha384,
            Self::HmacSha512 => DigestAlgorithm::Sha512,
        }
    }

    pub const fn output_len(self) -> usize {
        self.digest().output_len()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::HmacSha256 => "HS256",
            Self::HmacSha384 => "HS384",
            Self::HmacSha512 => "HS512",
        }
    }
}

impl fmt::Display for MacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MacAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HS256" | "HMAC-SHA256" | "HMAC-SHA-256" => Ok(Self::HmacSha256),
            "HS384" | "HMAC-SHA384" | "HMAC-SHA-384" => Ok(Self::HmacSha384),
            "HS512" | "HMAC-SHA512" | "HMAC-SHA-512" => Ok(Self::HmacSha512),
            _ => Err(CryptoError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for MacAlgorithm {
    type Error = CryptoError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<MacAlgorithm> for &'static str {
    fn from(alg: MacAlgorithm) -> Self {
        alg.name()
    }
}

/// Authentication tag. Equality is constant-time.
#[derive(Clone)]
pub struct Tag {
    algorithm: MacAlgorithm,
    bytes: Vec<u8>,
}

impl Tag {
    pub fn algorithm(&self) -> MacAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Constant-time comparison against received tag bytes
    pub fn ct_matches(&self, received: &[u8]) -> bool {
        self.bytes.ct_eq(received).into()
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.ct_matches(&other.bytes)
    }
}

impl Eq for Tag {}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("algorithm", &self.algorithm)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

enum Inner {
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

impl Inner {
    fn new(algorithm: MacAlgorithm, key: &[u8]) -> Result<Self> {
        // HMAC accepts any key length; long keys are hashed down internally.
        let inner = match algorithm {
            MacAlgorithm::HmacSha256 => {
                Self::Sha256(Hmac::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?)
            }
            MacAlgorithm::HmacSha384 => {
                Self::Sha384(Hmac::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?)
            }
            MacAlgorithm::HmacSha512 => {
                Self::Sha512(Hmac::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?)
            }
        };
        Ok(inner)
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(m) => m.update(data),
            Self::Sha384(m) => m.update(data),
            Self::Sha512(m) => m.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(m) => m.finalize().into_bytes().to_vec(),
            Self::Sha384(m) => m.finalize().into_bytes().to_vec(),
            Self::Sha512(m) => m.finalize().into_bytes().to_vec(),
        }
    }
}

/// Keyed incremental MAC, same lifecycle as
/// [`DigestState`](crate::crypto::digest::DigestState).
pub struct MacState {
    algorithm: MacAlgorithm,
    phase: Phase,
    inner: Option<Inner>,
}

impl MacState {
    pub fn init(key: &KeyMaterial, algorithm: MacAlgorithm) -> Result<Self> {
        Self::with_key_bytes(key.expose_secret(), algorithm)
    }

    /// Key with raw bytes. Used where the key is public input, such as the
    /// HKDF salt.
    pub(crate) fn with_key_bytes(key: &[u8], algorithm: MacAlgorithm) -> Result<Self> {
        Ok(Self {
            algorithm,
            phase: Phase::Fresh,
            inner: Some(Inner::new(algorithm, key)?),
        })
    }

    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        let inner = self.inner.as_mut().ok_or(CryptoError::InvalidState)?;
        inner.update(data);
        self.phase = Phase::Accumulating;
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<Tag> {
        let inner = self.inner.take().ok_or(CryptoError::InvalidState)?;
        self.phase = Phase::Finalized;
        tracing::debug!(algorithm = %self.algorithm, "mac finalized");
        Ok(Tag {
            algorithm: self.algorithm,
            bytes: inner.finalize(),
        })
    }

    /// Finalize and compare with `expected` in constant time
    pub fn verify(&mut self, expected: &[u8]) -> Result<()> {
        let tag = self.finalize()?;
        if tag.ct_matches(expected) {
            Ok(())
        } else {
            Err(CryptoError::AuthenticationFailure)
        }
    }

    pub fn algorithm(&self) -> MacAlgorithm {
        self.algorithm
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl fmt::Debug for MacState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacState")
            .field("algorithm", &self.algorithm)
            .field("phase", &self.phase)
            .finish()
    }
}

/// One-shot MAC computation
pub fn compute(algorithm: MacAlgorithm, key: &KeyMaterial, data: &[u8]) -> Result<Tag> {
    let mut state = MacState::init(key, algorithm)?;
    state.update(data)?;
    state.finalize()
}

/// One-shot MAC verification
pub fn verify(algorithm: MacAlgorithm, key: &KeyMaterial, data: &[u8], tag: &[u8]) -> Result<()> {
    let mut state = MacState::init(key, algorithm)?;
    state.update(data)?;
    state.verify(tag)
}
