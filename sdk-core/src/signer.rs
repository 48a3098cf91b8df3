//! Named signing algorithms behind one interface, and a key-id keyed ring
//! of signers.

use crate::crypto::keys::KeyMaterial;
use crate::crypto::mac::{self, MacAlgorithm};
use crate::crypto::sig::{self, Curve, PrivateKey, PublicKey};
use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// JWS-style algorithm identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SignerAlgorithm {
    HS256,
    HS384,
    HS512,
    ES256,
    ES384,
    ES512,
    EdDSA,
}

impl SignerAlgorithm {
    pub const fn name(self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
            Self::EdDSA => "EdDSA",
        }
    }

    pub const fn is_symmetric(self) -> bool {
        matches!(self, Self::HS256 | Self::HS384 | Self::HS512)
    }
}

impl From<MacAlgorithm> for SignerAlgorithm {
    fn from(alg: MacAlgorithm) -> Self {
        match alg {
            MacAlgorithm::HmacSha256 => Self::HS256,
            MacAlgorithm::HmacSha384 => Self::HS384,
            MacAlgorithm::HmacSha512 => Self::HS512,
        }
    }
}

impl From<Curve> for SignerAlgorithm {
    fn from(curve: Curve) -> Self {
        match curve {
            Curve::P256 => Self::ES256,
            Curve::P384 => Self::ES384,
            Curve::P521 => Self::ES512,
            Curve::Ed25519 => Self::EdDSA,
        }
    }
}

impl fmt::Display for SignerAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignerAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            "ES512" => Ok(Self::ES512),
            "EdDSA" => Ok(Self::EdDSA),
            _ => Err(CryptoError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for SignerAlgorithm {
    type Error = CryptoError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SignerAlgorithm> for &'static str {
    fn from(alg: SignerAlgorithm) -> Self {
        alg.name()
    }
}

/// Something that can produce and check signatures over byte strings
pub trait Signer: Send + Sync {
    fn algorithm(&self) -> SignerAlgorithm;

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Never errors: malformed input is simply `false`
    fn verify(&self, signature: &[u8], data: &[u8]) -> bool;
}

/// HMAC signer. Verification recomputes and compares in constant time.
pub struct HmacSigner {
    algorithm: MacAlgorithm,
    key: KeyMaterial,
}

impl HmacSigner {
    pub fn new(algorithm: MacAlgorithm, key: KeyMaterial) -> Self {
        Self { algorithm, key }
    }
}

impl Signer for HmacSigner {
    fn algorithm(&self) -> SignerAlgorithm {
        self.algorithm.into()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(mac::compute(self.algorithm, &self.key, data)?.into_bytes())
    }

    fn verify(&self, signature: &[u8], data: &[u8]) -> bool {
        mac::verify(self.algorithm, &self.key, data, signature).is_ok()
    }
}

/// ECDSA / EdDSA signer. Built from a public key alone it can only verify.
pub struct AsymmetricSigner {
    private: Option<PrivateKey>,
    public: PublicKey,
}

impl AsymmetricSigner {
    pub fn from_private(private: PrivateKey) -> Self {
        let public = private.public_key().clone();
        Self {
            private: Some(private),
            public,
        }
    }

    pub fn from_public(public: PublicKey) -> Self {
        Self {
            private: None,
            public,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

impl Signer for AsymmetricSigner {
    fn algorithm(&self) -> SignerAlgorithm {
        self.public.curve().into()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let private = self.private.as_ref().ok_or(CryptoError::MissingPrivateKey)?;
        Ok(sig::sign(private, data)?.as_bytes().to_vec())
    }

    fn verify(&self, signature: &[u8], data: &[u8]) -> bool {
        sig::verify_bytes(&self.public, data, signature)
    }
}

/// Signers indexed by key id
#[derive(Default)]
pub struct KeyRing {
    signers: HashMap<String, Box<dyn Signer>>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signer, returning the one it replaced
    pub fn add(
        &mut self,
        kid: impl Into<String>,
        signer: Box<dyn Signer>,
    ) -> Option<Box<dyn Signer>> {
        let kid = kid.into();
        tracing::debug!(kid = %kid, algorithm = %signer.algorithm(), "signer registered");
        self.signers.insert(kid, signer)
    }

    pub fn remove(&mut self, kid: &str) -> Option<Box<dyn Signer>> {
        self.signers.remove(kid)
    }

    pub fn get(&self, kid: &str) -> Result<&dyn Signer> {
        self.signers
            .get(kid)
            .map(|s| &**s)
            .ok_or_else(|| CryptoError::UnknownKeyId(kid.to_string()))
    }

    pub fn sign(&self, kid: &str, data: &[u8]) -> Result<Vec<u8>> {
        self.get(kid)?.sign(data)
    }

    /// Unknown key ids verify as `false`
    pub fn verify(&self, kid: &str, signature: &[u8], data: &[u8]) -> bool {
        match self.signers.get(kid) {
            Some(signer) => signer.verify(signature, data),
            None => {
                tracing::debug!(kid = %kid, "verify with unknown key id");
                false
            }
        }
    }

    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.signers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}
