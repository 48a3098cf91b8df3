//! Secret key container

use crate::crypto;
use crate::error::Result;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque secret key bytes, wiped when dropped.
///
/// Immutable after construction, so a `&KeyMaterial` (or an `Arc` of one) can
/// be shared across threads. Not `Serialize`; `Debug` never prints the bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: Vec<u8>,
}

impl KeyMaterial {
    /// Copy caller bytes into a new container. The caller still owns (and
    /// should wipe) its original buffer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Take ownership of an existing buffer without copying.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Fresh random key of `len` bytes
    pub fn generate(len: usize) -> Result<Self> {
        let mut bytes = vec![0u8; len];
        crypto::fill(&mut bytes)?;
        tracing::debug!(len, "generated key material");
        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the raw secret. Keep the borrow short and never log it.
    pub fn expose_secret(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for KeyMaterial {}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("len", &self.bytes.len())
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_generate_length() {
        let key = KeyMaterial::generate(32).unwrap();
        assert_eq!(key.len(), 32);
        assert!(!key.is_empty());
    }

    #[test]
    fn test_debug_redacts() {
        let key = KeyMaterial::from_bytes(&[0xAB; 16]);
        let printed = format!("{:?}", key);
        assert!(printed.contains("redacted"));
        assert!(!printed.contains("171"));
    }

    #[test]
    fn test_zeroize_clears_bytes() {
        let mut key = KeyMaterial::from_bytes(&[0x42; 32]);
        key.zeroize();
        assert!(key.expose_secret().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_equality() {
        let a = KeyMaterial::from_bytes(b"same key");
        let b = KeyMaterial::from_bytes(b"same key");
        let c = KeyMaterial::from_bytes(b"other key");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_shared_across_threads() {
        let key = Arc::new(KeyMaterial::generate(32).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let key = Arc::clone(&key);
                std::thread::spawn(move || key.expose_secret().to_vec())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), key.expose_secret());
        }
    }
}
