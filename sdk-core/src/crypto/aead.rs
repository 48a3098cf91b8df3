//! AEAD (Authenticated Encryption with Associated Data) operations

use crate::crypto::{self, keys::KeyMaterial};
use crate::error::{CryptoError, Result};
use aes_gcm::{
    aead::{AeadInPlace, KeyInit, Nonce as CipherNonce, Tag as CipherTag},
    Aes128Gcm, Aes256Gcm,
};
use chacha20poly1305::{ChaCha20Poly1305, XChaCha20Poly1305};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Tag length shared by every supported algorithm
pub const TAG_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum AeadAlgorithm {
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
    XChaCha20Poly1305,
}

impl AeadAlgorithm {
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm | Self::ChaCha20Poly1305 | Self::XChaCha20Poly1305 => 32,
        }
    }

    pub const fn nonce_len(self) -> usize {
        match self {
            Self::XChaCha20Poly1305 => 24,
            _ => 12,
        }
    }

    pub const fn tag_len(self) -> usize {
        TAG_LEN
    }

    /// Largest plaintext a single call accepts
    pub const fn max_plaintext_len(self) -> u64 {
        match self {
            // 2^39 - 256 bits
            Self::Aes128Gcm | Self::Aes256Gcm => (1 << 36) - 32,
            // 2^32 blocks of 64 bytes, first block reserved for Poly1305 key
            Self::ChaCha20Poly1305 | Self::XChaCha20Poly1305 => (1 << 38) - 64,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Aes128Gcm => "AES-128-GCM",
            Self::Aes256Gcm => "AES-256-GCM",
            Self::ChaCha20Poly1305 => "ChaCha20-Poly1305",
            Self::XChaCha20Poly1305 => "XChaCha20-Poly1305",
        }
    }
}

impl fmt::Display for AeadAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AeadAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AES-128-GCM" | "A128GCM" => Ok(Self::Aes128Gcm),
            "AES-256-GCM" | "A256GCM" => Ok(Self::Aes256Gcm),
            "CHACHA20-POLY1305" => Ok(Self::ChaCha20Poly1305),
            "XCHACHA20-POLY1305" => Ok(Self::XChaCha20Poly1305),
            _ => Err(CryptoError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for AeadAlgorithm {
    type Error = CryptoError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<AeadAlgorithm> for &'static str {
    fn from(alg: AeadAlgorithm) -> Self {
        alg.name()
    }
}

/// Per-message nonce. Length is checked against the algorithm at
/// construction. Uniqueness per key is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce {
    bytes: Vec<u8>,
}

impl Nonce {
    pub fn new(algorithm: AeadAlgorithm, bytes: &[u8]) -> Result<Self> {
        check_len(algorithm.nonce_len(), bytes.len())?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Random nonce. Collision odds are only negligible for XChaCha's 24
    /// bytes; with 12-byte nonces prefer a counter past ~2^32 messages per key.
    pub fn generate(algorithm: AeadAlgorithm) -> Result<Self> {
        let mut bytes = vec![0u8; algorithm.nonce_len()];
        crypto::fill(&mut bytes)?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Authentication tag produced by `encrypt`. Equality is constant-time.
#[derive(Debug, Clone, Copy)]
pub struct AeadTag([u8; TAG_LEN]);

impl AeadTag {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; TAG_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
            expected: TAG_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }
}

impl PartialEq for AeadTag {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for AeadTag {}

/// Ciphertext with its detached tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: AeadTag,
}

impl Sealed {
    /// `ciphertext || tag`
    pub fn to_combined(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.ciphertext.len() + TAG_LEN);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag.0);
        out
    }

    pub fn from_combined(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < TAG_LEN {
            return Err(CryptoError::InvalidLength {
                expected: TAG_LEN,
                actual: bytes.len(),
            });
        }
        let (ciphertext, tag) = bytes.split_at(bytes.len() - TAG_LEN);
        Ok(Self {
            ciphertext: ciphertext.to_vec(),
            tag: AeadTag::from_slice(tag)?,
        })
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(CryptoError::InvalidLength { expected, actual })
    }
}

fn seal_with<C: AeadInPlace + KeyInit>(
    algorithm: AeadAlgorithm,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Sealed> {
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(CipherNonce::<C>::from_slice(nonce), aad, &mut buffer)
        .map_err(|_| CryptoError::LengthError {
            requested: plaintext.len(),
            max: usize::try_from(algorithm.max_plaintext_len()).unwrap_or(usize::MAX),
        })?;

    Ok(Sealed {
        ciphertext: buffer,
        tag: AeadTag::from_slice(&tag)?,
    })
}

fn open_with<C: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &AeadTag,
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    // The tag is checked over the ciphertext before the buffer is decrypted;
    // on failure the buffer still holds ciphertext and is dropped.
    cipher
        .decrypt_in_place_detached(
            CipherNonce::<C>::from_slice(nonce),
            aad,
            buffer.as_mut_slice(),
            CipherTag::<C>::from_slice(tag.as_bytes()),
        )
        .map_err(|_| CryptoError::AuthenticationFailure)?;
    Ok(buffer)
}

/// Encrypt `plaintext` and authenticate it together with `aad`
pub fn encrypt(
    algorithm: AeadAlgorithm,
    key: &KeyMaterial,
    nonce: &Nonce,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Sealed> {
    check_len(algorithm.key_len(), key.len())?;
    check_len(algorithm.nonce_len(), nonce.len())?;

    let key = key.expose_secret();
    let nonce = nonce.as_bytes();
    match algorithm {
        AeadAlgorithm::Aes128Gcm => seal_with::<Aes128Gcm>(algorithm, key, nonce, aad, plaintext),
        AeadAlgorithm::Aes256Gcm => seal_with::<Aes256Gcm>(algorithm, key, nonce, aad, plaintext),
        AeadAlgorithm::ChaCha20Poly1305 => {
            seal_with::<ChaCha20Poly1305>(algorithm, key, nonce, aad, plaintext)
        }
        AeadAlgorithm::XChaCha20Poly1305 => {
            seal_with::<XChaCha20Poly1305>(algorithm, key, nonce, aad, plaintext)
        }
    }
}

/// Verify the tag, then decrypt. Any mismatch in key, nonce, aad,
/// ciphertext or tag yields only [`CryptoError::AuthenticationFailure`].
pub fn decrypt(
    algorithm: AeadAlgorithm,
    key: &KeyMaterial,
    nonce: &Nonce,
    aad: &[u8],
    ciphertext: &[u8],
    tag: &AeadTag,
) -> Result<Zeroizing<Vec<u8>>> {
    check_len(algorithm.key_len(), key.len())?;
    check_len(algorithm.nonce_len(), nonce.len())?;

    let key = key.expose_secret();
    let nonce = nonce.as_bytes();
    let result = match algorithm {
        AeadAlgorithm::Aes128Gcm => open_with::<Aes128Gcm>(key, nonce, aad, ciphertext, tag),
        AeadAlgorithm::Aes256Gcm => open_with::<Aes256Gcm>(key, nonce, aad, ciphertext, tag),
        AeadAlgorithm::ChaCha20Poly1305 => {
            open_with::<ChaCha20Poly1305>(key, nonce, aad, ciphertext, tag)
        }
        AeadAlgorithm::XChaCha20Poly1305 => {
            open_with::<XChaCha20Poly1305>(key, nonce, aad, ciphertext, tag)
        }
    };

    if result.is_err() {
        tracing::warn!(algorithm = %algorithm, "AEAD authentication failed");
    }
    result
}
