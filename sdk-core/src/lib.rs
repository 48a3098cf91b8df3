//! Tessera SDK Core Library
//!
//! Hashing, HMAC, HKDF, AEAD and signatures behind a small, explicit API.
//! Algorithms are picked from closed enums; secret keys live in
//! [`KeyMaterial`] and are wiped on drop.

pub mod config;
pub mod crypto;
pub mod error;
pub mod signer;
pub mod suite;

// Re-exports
pub use config::CryptoConfig;
pub use crypto::aead::{AeadAlgorithm, AeadTag, Nonce, Sealed};
pub use crypto::digest::{Digest, DigestAlgorithm, DigestState};
pub use crypto::keys::KeyMaterial;
pub use crypto::mac::{MacAlgorithm, MacState, Tag};
pub use crypto::sig::{Curve, PrivateKey, PublicKey, Signature};
pub use error::{CryptoError, Result};
pub use signer::{AsymmetricSigner, HmacSigner, KeyRing, Signer, SignerAlgorithm};
pub use suite::Suite;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
