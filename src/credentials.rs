//! # Credentials
//!
//! Verify keys identify the caller of every store operation and double as
//! queryable attribute values on stored documents.
//!
//! A verify key is 32 opaque bytes. Equality is byte-exact and ordering is
//! lexicographic over the bytes, so keys can live in ordered indexes.
//! The textual form is unpadded URL-safe base64.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Length of a verify key in bytes
pub const VERIFY_KEY_LENGTH: usize = 32;

/// Errors raised while parsing a verify key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Text was not valid URL-safe base64
    #[error("Invalid verify key encoding: {0}")]
    InvalidEncoding(String),

    /// Decoded bytes had the wrong length
    #[error("Invalid verify key length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Public verification key of a principal
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerifyKey([u8; VERIFY_KEY_LENGTH]);

impl VerifyKey {
    /// Wrap raw key bytes
    pub const fn from_bytes(bytes: [u8; VERIFY_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Generate a random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFY_KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; VERIFY_KEY_LENGTH] {
        &self.0
    }

    /// Unpadded URL-safe base64 encoding
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }
}

impl fmt::Debug for VerifyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyKey({})", self.to_base64())
    }
}

impl fmt::Display for VerifyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl FromStr for VerifyKey {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = URL_SAFE_NO_PAD
            .decode(s.trim())
            .map_err(|e| CredentialError::InvalidEncoding(e.to_string()))?;

        let bytes: [u8; VERIFY_KEY_LENGTH] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| CredentialError::InvalidLength(decoded.len()))?;

        Ok(Self(bytes))
    }
}

impl Serialize for VerifyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for VerifyKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
