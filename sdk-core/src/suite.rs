//! High-level operations bound to one configured algorithm suite

use crate::{
    config::CryptoConfig,
    crypto::{
        aead::{self, AeadTag, Nonce, Sealed},
        digest::{self, Digest},
        kdf,
        keys::KeyMaterial,
        mac::{self, Tag},
        sig::{self, PrivateKey, PublicKey, Signature},
    },
    error::{CryptoError, Result},
};
use zeroize::Zeroizing;

/// Suite operations
#[derive(Debug, Clone, Default)]
pub struct Suite {
    config: CryptoConfig,
}

impl Suite {
    pub fn new(config: CryptoConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            digest = %config.digest,
            mac = %config.mac,
            aead = %config.aead,
            curve = %config.curve,
            "suite configured"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    pub fn digest(&self, data: &[u8]) -> Digest {
        digest::one_shot(self.config.digest, data)
    }

    pub fn mac(&self, key: &KeyMaterial, data: &[u8]) -> Result<Tag> {
        self.check_mac_key(key)?;
        mac::compute(self.config.mac, key, data)
    }

    pub fn verify_mac(&self, key: &KeyMaterial, data: &[u8], tag: &[u8]) -> Result<()> {
        self.check_mac_key(key)?;
        mac::verify(self.config.mac, key, data, tag)
    }

    /// Derive a key sized for the suite's AEAD
    pub fn derive_key(&self, salt: &[u8], ikm: &KeyMaterial, info: &[u8]) -> Result<KeyMaterial> {
        kdf::derive(self.config.mac, salt, ikm, info, self.config.aead.key_len())
    }

    pub fn generate_aead_key(&self) -> Result<KeyMaterial> {
        KeyMaterial::generate(self.config.aead.key_len())
    }

    /// Nonce of the right length for the suite's AEAD; uniqueness is still
    /// on the caller
    pub fn nonce(&self, bytes: &[u8]) -> Result<Nonce> {
        Nonce::new(self.config.aead, bytes)
    }

    pub fn seal(
        &self,
        key: &KeyMaterial,
        nonce: &Nonce,
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Sealed> {
        aead::encrypt(self.config.aead, key, nonce, aad, plaintext)
    }

    pub fn open(
        &self,
        key: &KeyMaterial,
        nonce: &Nonce,
        aad: &[u8],
        sealed: &Sealed,
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.open_detached(key, nonce, aad, &sealed.ciphertext, &sealed.tag)
    }

    pub fn open_detached(
        &self,
        key: &KeyMaterial,
        nonce: &Nonce,
        aad: &[u8],
        ciphertext: &[u8],
        tag: &AeadTag,
    ) -> Result<Zeroizing<Vec<u8>>> {
        aead::decrypt(self.config.aead, key, nonce, aad, ciphertext, tag)
    }

    pub fn generate_key_pair(&self) -> Result<(PrivateKey, PublicKey)> {
        sig::generate_key_pair(self.config.curve)
    }

    pub fn sign(&self, private_key: &PrivateKey, message: &[u8]) -> Result<Signature> {
        if private_key.curve() != self.config.curve {
            return Err(CryptoError::UnsupportedAlgorithm(private_key.curve().to_string()));
        }
        sig::sign(private_key, message)
    }

    pub fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        public_key.curve() == self.config.curve && sig::verify(public_key, message, signature)
    }

    fn check_mac_key(&self, key: &KeyMaterial) -> Result<()> {
        if key.len() < self.config.min_mac_key_len {
            return Err(CryptoError::InvalidLength {
                expected: self.config.min_mac_key_len,
                actual: key.len(),
            });
        }
        Ok(())
    }
}
