//! Key Derivation Functions
//!
//! HKDF (RFC 5869) extract-and-expand built on the MAC engine.

use crate::crypto::keys::KeyMaterial;
use crate::crypto::mac::{MacAlgorithm, MacState};
use crate::error::{CryptoError, Result};
use zeroize::Zeroizing;

/// Largest output `expand` can produce for `algorithm`
pub const fn max_output_len(algorithm: MacAlgorithm) -> usize {
    255 * algorithm.output_len()
}

/// HKDF-Extract: PRK = HMAC(salt, IKM).
///
/// An empty salt is replaced by a digest-length string of zeros.
pub fn extract(algorithm: MacAlgorithm, salt: &[u8], ikm: &KeyMaterial) -> Result<KeyMaterial> {
    let zeros;
    let salt = if salt.is_empty() {
        zeros = vec![0u8; algorithm.output_len()];
        zeros.as_slice()
    } else {
        salt
    };

    let mut state = MacState::with_key_bytes(salt, algorithm)?;
    state.update(ikm.expose_secret())?;
    Ok(KeyMaterial::from_vec(state.finalize()?.into_bytes()))
}

/// HKDF-Expand: T(i) = HMAC(PRK, T(i-1) || info || i), truncated to
/// `output_len` bytes.
pub fn expand(
    algorithm: MacAlgorithm,
    prk: &KeyMaterial,
    info: &[u8],
    output_len: usize,
) -> Result<KeyMaterial> {
    let max = max_output_len(algorithm);
    if output_len > max {
        return Err(CryptoError::LengthError {
            requested: output_len,
            max,
        });
    }
    if prk.len() < algorithm.output_len() {
        return Err(CryptoError::InvalidLength {
            expected: algorithm.output_len(),
            actual: prk.len(),
        });
    }

    let mut okm = Zeroizing::new(Vec::with_capacity(output_len));
    let mut previous = Zeroizing::new(Vec::new());
    let mut counter: u8 = 1;

    while okm.len() < output_len {
        let mut state = MacState::init(prk, algorithm)?;
        state.update(&previous)?;
        state.update(info)?;
        state.update(&[counter])?;
        previous = Zeroizing::new(state.finalize()?.into_bytes());

        let take = (output_len - okm.len()).min(previous.len());
        okm.extend_from_slice(&previous[..take]);
        counter = counter.wrapping_add(1);
    }

    tracing::debug!(algorithm = %algorithm, output_len, "expanded key material");
    Ok(KeyMaterial::from_bytes(&okm))
}

/// Extract then expand in one call
pub fn derive(
    algorithm: MacAlgorithm,
    salt: &[u8],
    ikm: &KeyMaterial,
    info: &[u8],
    output_len: usize,
) -> Result<KeyMaterial> {
    let prk = extract(algorithm, salt, ikm)?;
    expand(algorithm, &prk, info, output_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // RFC 5869 test case 1
    #[test]
    fn test_rfc5869_case1() {
        let ikm = KeyMaterial::from_bytes(&[0x0b; 22]);
        let salt = hex!("000102030405060708090a0b0c");
        let info = hex!("f0f1f2f3f4f5f6f7f8f9");

        let prk = extract(MacAlgorithm::HmacSha256, &salt, &ikm).unwrap();
        assert_eq!(
            prk.expose_secret(),
            hex!("077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5")
        );

        let okm = expand(MacAlgorithm::HmacSha256, &prk, &info, 42).unwrap();
        assert_eq!(
            okm.expose_secret(),
            hex!(
                "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf"
                "34007208d5b887185865"
            )
        );
    }

    #[test]
    fn test_matches_hkdf_crate() {
        let ikm = b"input key material";
        let salt = b"salt";
        let info = b"info";

        let ours = derive(
            MacAlgorithm::HmacSha512,
            salt,
            &KeyMaterial::from_bytes(ikm),
            info,
            100,
        )
        .unwrap();

        let hk = hkdf::Hkdf::<sha2::Sha512>::new(Some(&salt[..]), ikm);
        let mut reference = [0u8; 100];
        hk.expand(info, &mut reference).unwrap();

        assert_eq!(ours.expose_secret(), reference);
    }

    #[test]
    fn test_empty_salt_equals_zero_salt() {
        let ikm = KeyMaterial::from_bytes(b"ikm");
        let a = extract(MacAlgorithm::HmacSha256, b"", &ikm).unwrap();
        let b = extract(MacAlgorithm::HmacSha256, &[0u8; 32], &ikm).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_length_bounds() {
        let ikm = KeyMaterial::from_bytes(b"ikm");
        let prk = extract(MacAlgorithm::HmacSha256, b"salt", &ikm).unwrap();

        let max = expand(MacAlgorithm::HmacSha256, &prk, b"", 255 * 32).unwrap();
        assert_eq!(max.len(), 8160);

        assert_eq!(
            expand(MacAlgorithm::HmacSha256, &prk, b"", 255 * 32 + 1).unwrap_err(),
            CryptoError::LengthError {
                requested: 8161,
                max: 8160
            }
        );

        let empty = expand(MacAlgorithm::HmacSha256, &prk, b"", 0).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_short_prk_rejected() {
        let prk = KeyMaterial::from_bytes(&[1u8; 16]);
        assert_eq!(
            expand(MacAlgorithm::HmacSha256, &prk, b"", 32).unwrap_err(),
            CryptoError::InvalidLength {
                expected: 32,
                actual: 16
            }
        );
    }

    #[test]
    fn test_prefix_consistency() {
        let ikm = KeyMaterial::from_bytes(b"k");
        let prk = extract(MacAlgorithm::HmacSha384, b"s", &ikm).unwrap();
        let short = expand(MacAlgorithm::HmacSha384, &prk, b"ctx", 20).unwrap();
        let long = expand(MacAlgorithm::HmacSha384, &prk, b"ctx", 100).unwrap();
        assert_eq!(short.expose_secret(), &long.expose_secret()[..20]);
    }
}
