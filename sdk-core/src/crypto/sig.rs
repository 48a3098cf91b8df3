//! Digital signature operations
//!
//! ECDSA over P-256/P-384/P-521 signs a prehash computed by the digest engine,
//! with RFC 6979 deterministic nonces. Ed25519 is PureEdDSA over the raw
//! message. Both are deterministic, so signing never consults the random
//! source.

use crate::crypto::digest::{self, DigestAlgorithm};
use crate::crypto::{self, keys::KeyMaterial};
use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Curve {
    P256,
    P384,
    P521,
    Ed25519,
}

impl Curve {
    /// Hash underlying the scheme. ECDSA prehashes with it; Ed25519 applies
    /// SHA-512 internally.
    pub const fn digest(self) -> DigestAlgorithm {
        match self {
            Self::P256 => DigestAlgorithm::Sha256,
            Self::P384 => DigestAlgorithm::Sha384,
            Self::P521 | Self::Ed25519 => DigestAlgorithm::Sha512,
        }
    }

    pub const fn secret_len(self) -> usize {
        match self {
            Self::P256 | Self::Ed25519 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Length of the fixed-size signature encoding
    pub const fn signature_len(self) -> usize {
        match self {
            Self::P256 | Self::Ed25519 => 64,
            Self::P384 => 96,
            Self::P521 => 132,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
            Self::Ed25519 => "Ed25519",
        }
    }

    /// JWS `alg` value
    pub const fn jws_name(self) -> &'static str {
        match self {
            Self::P256 => "ES256",
            Self::P384 => "ES384",
            Self::P521 => "ES512",
            Self::Ed25519 => "EdDSA",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Curve {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "P-256" | "P256" | "SECP256R1" => Ok(Self::P256),
            "P-384" | "P384" | "SECP384R1" => Ok(Self::P384),
            "P-521" | "P521" | "SECP521R1" => Ok(Self::P521),
            "ED25519" => Ok(Self::Ed25519),
            _ => Err(CryptoError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for Curve {
    type Error = CryptoError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Curve> for &'static str {
    fn from(curve: Curve) -> Self {
        curve.name()
    }
}

macro_rules! ecdsa_backend {
    ($module:ident, $krate:ident, $digest:expr) => {
        mod $module {
            use super::*;
            use $krate::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
            use $krate::ecdsa::{Signature as EcSignature, SigningKey, VerifyingKey};

            fn signing_key(secret: &[u8]) -> Result<SigningKey> {
                SigningKey::from_slice(secret).map_err(|_| CryptoError::InvalidKey)
            }

            fn encode(vk: &VerifyingKey) -> Vec<u8> {
                vk.to_encoded_point(false).as_bytes().to_vec()
            }

            pub(super) fn public_from_secret(secret: &[u8]) -> Result<Vec<u8>> {
                let sk = signing_key(secret)?;
                Ok(encode(&VerifyingKey::from(&sk)))
            }

            /// Accepts compressed or uncompressed SEC1, returns uncompressed
            pub(super) fn normalize_public(bytes: &[u8]) -> Result<Vec<u8>> {
                let vk = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidKey)?;
                Ok(encode(&vk))
            }

            pub(super) fn sign(secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
                let prehash = digest::one_shot($digest, message);
                let sig: EcSignature = signing_key(secret)?
                    .sign_prehash(prehash.as_bytes())
                    .map_err(|_| CryptoError::InvalidKey)?;
                Ok(sig.to_bytes().to_vec())
            }

            pub(super) fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> bool {
                let Ok(vk) = VerifyingKey::from_sec1_bytes(public) else {
                    return false;
                };
                let Ok(sig) = EcSignature::from_slice(signature) else {
                    return false;
                };
                let prehash = digest::one_shot($digest, message);
                vk.verify_prehash(prehash.as_bytes(), &sig).is_ok()
            }

            pub(super) fn to_der(raw: &[u8]) -> Result<Vec<u8>> {
                let sig = EcSignature::from_slice(raw).map_err(|_| CryptoError::InvalidEncoding)?;
                Ok(sig.to_der().as_bytes().to_vec())
            }

            pub(super) fn from_der(der: &[u8]) -> Result<Vec<u8>> {
                let sig = EcSignature::from_der(der).map_err(|_| CryptoError::InvalidEncoding)?;
                Ok(sig.to_bytes().to_vec())
            }
        }
    };
}

ecdsa_backend!(ecdsa_p256, p256, DigestAlgorithm::Sha256);
ecdsa_backend!(ecdsa_p384, p384, DigestAlgorithm::Sha384);
ecdsa_backend!(ecdsa_p521, p521, DigestAlgorithm::Sha512);

mod ed25519 {
    use super::*;
    use ed25519_dalek::{Signature as EdSignature, Signer as _, SigningKey, VerifyingKey};

    fn signing_key(secret: &[u8]) -> Result<SigningKey> {
        let seed: &[u8; 32] = secret.try_into().map_err(|_| CryptoError::InvalidKey)?;
        Ok(SigningKey::from_bytes(seed))
    }

    pub(super) fn public_from_secret(secret: &[u8]) -> Result<Vec<u8>> {
        Ok(signing_key(secret)?.verifying_key().to_bytes().to_vec())
    }

    pub(super) fn normalize_public(bytes: &[u8]) -> Result<Vec<u8>> {
        let raw: &[u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKey)?;
        let vk = VerifyingKey::from_bytes(raw).map_err(|_| CryptoError::InvalidKey)?;
        Ok(vk.to_bytes().to_vec())
    }

    pub(super) fn sign(secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        Ok(signing_key(secret)?.sign(message).to_bytes().to_vec())
    }

    pub(super) fn verify(public: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let Ok(raw) = <&[u8; 32]>::try_from(public) else {
            return false;
        };
        let Ok(vk) = VerifyingKey::from_bytes(raw) else {
            return false;
        };
        let Ok(sig) = EdSignature::from_slice(signature) else {
            return false;
        };
        vk.verify_strict(message, &sig).is_ok()
    }
}

/// Public half of a key pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    curve: Curve,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Parse SEC1 (ECDSA) or raw 32-byte (Ed25519) encoding
    pub fn from_bytes(curve: Curve, bytes: &[u8]) -> Result<Self> {
        let bytes = match curve {
            Curve::P256 => ecdsa_p256::normalize_public(bytes)?,
            Curve::P384 => ecdsa_p384::normalize_public(bytes)?,
            Curve::P521 => ecdsa_p521::normalize_public(bytes)?,
            Curve::Ed25519 => ed25519::normalize_public(bytes)?,
        };
        Ok(Self { curve, bytes })
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Uncompressed SEC1 for ECDSA, raw 32 bytes for Ed25519
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// Secret half of a key pair, validated against its curve
#[derive(Debug)]
pub struct PrivateKey {
    curve: Curve,
    secret: KeyMaterial,
    public: PublicKey,
}

impl PrivateKey {
    pub fn from_key_material(curve: Curve, secret: KeyMaterial) -> Result<Self> {
        if secret.len() != curve.secret_len() {
            return Err(CryptoError::InvalidLength {
                expected: curve.secret_len(),
                actual: secret.len(),
            });
        }
        let public = match curve {
            Curve::P256 => ecdsa_p256::public_from_secret(secret.expose_secret())?,
            Curve::P384 => ecdsa_p384::public_from_secret(secret.expose_secret())?,
            Curve::P521 => ecdsa_p521::public_from_secret(secret.expose_secret())?,
            Curve::Ed25519 => ed25519::public_from_secret(secret.expose_secret())?,
        };
        Ok(Self {
            curve,
            secret,
            public: PublicKey {
                curve,
                bytes: public,
            },
        })
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn secret(&self) -> &KeyMaterial {
        &self.secret
    }
}

/// Fixed-size signature: `r || s` for ECDSA, 64 bytes for Ed25519
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    curve: Curve,
    bytes: Vec<u8>,
}

impl Signature {
    pub fn from_bytes(curve: Curve, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != curve.signature_len() {
            return Err(CryptoError::InvalidLength {
                expected: curve.signature_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self {
            curve,
            bytes: bytes.to_vec(),
        })
    }

    /// Parse an ASN.1 DER ECDSA signature
    pub fn from_der(curve: Curve, der: &[u8]) -> Result<Self> {
        let bytes = match curve {
            Curve::P256 => ecdsa_p256::from_der(der)?,
            Curve::P384 => ecdsa_p384::from_der(der)?,
            Curve::P521 => ecdsa_p521::from_der(der)?,
            Curve::Ed25519 => return Err(CryptoError::UnsupportedAlgorithm("Ed25519 DER".into())),
        };
        Ok(Self { curve, bytes })
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        match self.curve {
            Curve::P256 => ecdsa_p256::to_der(&self.bytes),
            Curve::P384 => ecdsa_p384::to_der(&self.bytes),
            Curve::P521 => ecdsa_p521::to_der(&self.bytes),
            Curve::Ed25519 => Err(CryptoError::UnsupportedAlgorithm("Ed25519 DER".into())),
        }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Generate a key pair from the random source
pub fn generate_key_pair(curve: Curve) -> Result<(PrivateKey, PublicKey)> {
    // Rejection sampling: ECDSA scalars must be in [1, n). Retries are
    // astronomically rare.
    loop {
        let mut bytes = Zeroizing::new(vec![0u8; curve.secret_len()]);
        crypto::fill(&mut bytes)?;
        if curve == Curve::P521 {
            // 66 bytes carry 528 bits; n is 521 bits
            bytes[0] &= 0x01;
        }
        let secret = KeyMaterial::from_bytes(&bytes);
        match PrivateKey::from_key_material(curve, secret) {
            Ok(private) => {
                tracing::debug!(curve = %curve, "generated key pair");
                let public = private.public_key().clone();
                return Ok((private, public));
            }
            Err(CryptoError::InvalidKey) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Sign `message`, deterministic for a given key and message
pub fn sign(private_key: &PrivateKey, message: &[u8]) -> Result<Signature> {
    let secret = private_key.secret.expose_secret();
    let bytes = match private_key.curve {
        Curve::P256 => ecdsa_p256::sign(secret, message)?,
        Curve::P384 => ecdsa_p384::sign(secret, message)?,
        Curve::P521 => ecdsa_p521::sign(secret, message)?,
        Curve::Ed25519 => ed25519::sign(secret, message)?,
    };
    Ok(Signature {
        curve: private_key.curve,
        bytes,
    })
}

/// Pure verification; a malformed or mismatched signature is `false`
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    if public_key.curve != signature.curve {
        return false;
    }
    verify_bytes(public_key, message, &signature.bytes)
}

/// Verify untrusted signature bytes without parsing them first
pub fn verify_bytes(public_key: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
    if signature.len() != public_key.curve.signature_len() {
        return false;
    }
    match public_key.curve {
        Curve::P256 => ecdsa_p256::verify(&public_key.bytes, message, signature),
        Curve::P384 => ecdsa_p384::verify(&public_key.bytes, message, signature),
        Curve::P521 => ecdsa_p521::verify(&public_key.bytes, message, signature),
        Curve::Ed25519 => ed25519::verify(&public_key.bytes, message, signature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const ALL: [Curve; 4] = [Curve::P256, Curve::P384, Curve::P521, Curve::Ed25519];

    #[test]
    fn test_roundtrip_all_curves() {
        for curve in ALL {
            let (sk, pk) = generate_key_pair(curve).unwrap();
            let msg = b"Test message";
            let sig = sign(&sk, msg).unwrap();
            assert_eq!(sig.as_bytes().len(), curve.signature_len());
            assert!(verify(&pk, msg, &sig), "{}", curve);
            assert!(!verify(&pk, b"Other message", &sig), "{}", curve);
        }
    }

    #[test]
    fn test_wrong_public_key() {
        for curve in ALL {
            let (sk, _) = generate_key_pair(curve).unwrap();
            let (_, other_pk) = generate_key_pair(curve).unwrap();
            let sig = sign(&sk, b"msg").unwrap();
            assert!(!verify(&other_pk, b"msg", &sig));
        }
    }

    #[test]
    fn test_deterministic() {
        for curve in ALL {
            let (sk, _) = generate_key_pair(curve).unwrap();
            assert_eq!(sign(&sk, b"same").unwrap(), sign(&sk, b"same").unwrap());
        }
    }

    #[test]
    fn test_malformed_signature_is_false() {
        let (_, pk) = generate_key_pair(Curve::P256).unwrap();
        assert!(!verify_bytes(&pk, b"msg", &[0u8; 64]));
        assert!(!verify_bytes(&pk, b"msg", &[0xFFu8; 64]));
        assert!(!verify_bytes(&pk, b"msg", &[1u8; 10]));
        assert!(!verify_bytes(&pk, b"msg", &[]));

        let (_, ed_pk) = generate_key_pair(Curve::Ed25519).unwrap();
        assert!(!verify_bytes(&ed_pk, b"msg", &[0u8; 64]));
    }

    #[test]
    fn test_curve_mismatch_is_false() {
        let (sk, _) = generate_key_pair(Curve::Ed25519).unwrap();
        let (_, pk) = generate_key_pair(Curve::P256).unwrap();
        let sig = sign(&sk, b"msg").unwrap();
        assert!(!verify(&pk, b"msg", &sig));
    }

    // RFC 8032 section 7.1, test 1
    #[test]
    fn test_ed25519_rfc8032_vector() {
        let secret = KeyMaterial::from_bytes(&hex!(
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60"
        ));
        let sk = PrivateKey::from_key_material(Curve::Ed25519, secret).unwrap();
        assert_eq!(
            sk.public_key().as_bytes(),
            hex!("d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a")
        );

        let sig = sign(&sk, b"").unwrap();
        assert_eq!(
            sig.as_bytes(),
            hex!(
                "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155"
                "5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
            )
        );
        assert!(verify(sk.public_key(), b"", &sig));
    }

    // RFC 6979 appendix A.2.5, P-256 with SHA-256, message "sample"
    #[test]
    fn test_p256_rfc6979_vector() {
        let secret = KeyMaterial::from_bytes(&hex!(
            "c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721"
        ));
        let sk = PrivateKey::from_key_material(Curve::P256, secret).unwrap();
        assert_eq!(
            sk.public_key().as_bytes(),
            hex!(
                "04"
                "60fed4ba255a9d31c961eb74c6356d68c049b8923b61fa6ce669622e60f29fb6"
                "7903fe1008b8bc99a41ae9e95628bc64f2f1b20c2d7e9f5177a3c294d4462299"
            )
        );

        let sig = sign(&sk, b"sample").unwrap();
        assert_eq!(
            sig.as_bytes(),
            hex!(
                "efd48b2aacb6a8fd1140dd9cd45e81d69d2c877b56aaf991c34d0ea84eaf3716"
                "f7cb1c942d657c41d436c7a1b6e29f65f3e900dbb9aff4064dc4ab2f843acda8"
            )
        );
    }

    // RFC 6979 appendix A.2.7, P-521 with SHA-512, message "sample"
    #[test]
    fn test_p521_rfc6979_vector() {
        let secret = KeyMaterial::from_bytes(&hex!(
            "00fad06daa62ba3b25d2fb40133da757205de67f5bb0018fee8c86e1b68c7e75ca"
            "a896eb32f1f47c70855836a6d16fcc1466f6d8fbec67db89ec0c08b0e996b83538"
        ));
        let sk = PrivateKey::from_key_material(Curve::P521, secret).unwrap();
        assert_eq!(
            sk.public_key().as_bytes(),
            hex!(
                "04"
                "01894550d0785932e00eaa23b694f213f8c3121f86dc97a04e5a7167db4e5bcd37"
                "1123d46e45db6b5d5370a7f20fb633155d38ffa16d2bd761dcac474b9a2f5023a4"
                "00493101c962cd4d2fddf782285e64584139c2f91b47f87ff82354d6630f746a28"
                "a0db25741b5b34a828008b22acc23f924faafbd4d33f81ea66956dfeaa2bfdfcf5"
            )
        );

        let sig = sign(&sk, b"sample").unwrap();
        assert_eq!(
            sig.as_bytes(),
            hex!(
                "00c328fafcbd79dd77850370c46325d987cb525569fb63c5d3bc53950e6d4c5f17"
                "4e25a1ee9017b5d450606add152b534931d7d4e8455cc91f9b15bf05ec36e377fa"
                "00617cce7cf5064806c467f678d3b4080d6f1cc50af26ca209417308281b68af28"
                "2623eaa63e5b5c0723d8b8c37ff0777b1a20f8ccb1dccc43997f1ee0e44da4a67a"
            )
        );
        assert!(verify(sk.public_key(), b"sample", &sig));
    }

    #[test]
    fn test_curve_names() {
        for curve in ALL {
            assert_eq!(curve.name().parse::<Curve>().unwrap(), curve);
            let json = serde_json::to_string(&curve).unwrap();
            assert_eq!(serde_json::from_str::<Curve>(&json).unwrap(), curve);
        }
        assert_eq!(
            serde_json::from_str::<Curve>("\"secp521r1\"").unwrap(),
            Curve::P521
        );
        assert_eq!(Curve::P521.jws_name(), "ES512");
        assert!(serde_json::from_str::<Curve>("\"P-192\"").is_err());
    }

    #[test]
    fn test_der_roundtrip() {
        for curve in [Curve::P256, Curve::P384, Curve::P521] {
            let (sk, pk) = generate_key_pair(curve).unwrap();
            let sig = sign(&sk, b"der").unwrap();
            let der = sig.to_der().unwrap();
            assert_eq!(der[0], 0x30);
            let parsed = Signature::from_der(curve, &der).unwrap();
            assert_eq!(parsed, sig);
            assert!(verify(&pk, b"der", &parsed));
        }

        let (sk, _) = generate_key_pair(Curve::Ed25519).unwrap();
        assert!(matches!(
            sign(&sk, b"x").unwrap().to_der(),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
        assert_eq!(
            Signature::from_der(Curve::P256, b"not der").unwrap_err(),
            CryptoError::InvalidEncoding
        );
    }

    #[test]
    fn test_public_key_encodings() {
        let (_, pk) = generate_key_pair(Curve::P256).unwrap();
        assert_eq!(pk.as_bytes().len(), 65);
        assert_eq!(pk.as_bytes()[0], 0x04);
        assert_eq!(PublicKey::from_bytes(Curve::P256, pk.as_bytes()).unwrap(), pk);

        let mut compressed = vec![0x02 | (pk.as_bytes()[64] & 1)];
        compressed.extend_from_slice(&pk.as_bytes()[1..33]);
        assert_eq!(PublicKey::from_bytes(Curve::P256, &compressed).unwrap(), pk);

        assert_eq!(
            PublicKey::from_bytes(Curve::P256, &[0x04; 65]).unwrap_err(),
            CryptoError::InvalidKey
        );
        assert_eq!(
            PublicKey::from_bytes(Curve::Ed25519, &[0u8; 31]).unwrap_err(),
            CryptoError::InvalidKey
        );
    }

    #[test]
    fn test_invalid_private_keys() {
        assert_eq!(
            PrivateKey::from_key_material(Curve::P256, KeyMaterial::from_bytes(&[0u8; 32]))
                .unwrap_err(),
            CryptoError::InvalidKey
        );
        assert_eq!(
            PrivateKey::from_key_material(Curve::P384, KeyMaterial::from_bytes(&[1u8; 32]))
                .unwrap_err(),
            CryptoError::InvalidLength {
                expected: 48,
                actual: 32
            }
        );
    }

    #[test]
    fn test_signature_length_checked() {
        assert!(Signature::from_bytes(Curve::P384, &[0u8; 96]).is_ok());
        assert!(Signature::from_bytes(Curve::P384, &[0u8; 64]).is_err());
        assert!(Signature::from_bytes(Curve::P521, &[0u8; 132]).is_ok());
        assert!(Signature::from_bytes(Curve::P521, &[0u8; 128]).is_err());
    }
}
