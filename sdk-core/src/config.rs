//! Algorithm suite configuration

use crate::crypto::aead::AeadAlgorithm;
use crate::crypto::digest::DigestAlgorithm;
use crate::crypto::mac::MacAlgorithm;
use crate::crypto::sig::Curve;
use crate::error::{CryptoError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which algorithms a [`Suite`](crate::suite::Suite) uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub digest: DigestAlgorithm,
    pub mac: MacAlgorithm,
    pub aead: AeadAlgorithm,
    pub curve: Curve,
    /// Shortest MAC key the suite accepts, in bytes
    pub min_mac_key_len: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::Sha256,
            mac: MacAlgorithm::HmacSha256,
            aead: AeadAlgorithm::Aes256Gcm,
            curve: Curve::P256,
            min_mac_key_len: 32,
        }
    }
}

/// JSON shape with algorithm names still as text
#[derive(Deserialize)]
struct RawConfig {
    digest: Option<String>,
    mac: Option<String>,
    aead: Option<String>,
    curve: Option<String>,
    min_mac_key_len: Option<usize>,
}

fn parse_or<T: FromStr<Err = CryptoError>>(name: Option<String>, default: T) -> Result<T> {
    name.map_or(Ok(default), |name| name.parse())
}

impl CryptoConfig {
    /// Parse from JSON. Missing fields take their defaults. Algorithm names
    /// go through each enum's `FromStr`, so unknown ones fail with
    /// [`CryptoError::UnsupportedAlgorithm`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|e| CryptoError::Config(e.to_string()))?;
        let defaults = Self::default();
        let config = Self {
            digest: parse_or(raw.digest, defaults.digest)?,
            mac: parse_or(raw.mac, defaults.mac)?,
            aead: parse_or(raw.aead, defaults.aead)?,
            curve: parse_or(raw.curve, defaults.curve)?,
            min_mac_key_len: raw.min_mac_key_len.unwrap_or(defaults.min_mac_key_len),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CryptoError::Config(e.to_string()))
    }

    /// Reject MAC key floors below half the MAC output (RFC 2104 section 3)
    pub fn validate(&self) -> Result<()> {
        let floor = self.mac.output_len() / 2;
        if self.min_mac_key_len < floor {
            return Err(CryptoError::Config(format!(
                "min_mac_key_len {} is below {} for {}",
                self.min_mac_key_len, floor, self.mac
            )));
        }
        Ok(())
    }
}
