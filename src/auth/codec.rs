//! Symmetric Token Codec
//! Mission: Seal claims into opaque, tamper-evident, URL-safe tokens
//!
//! Token layout: `plam.local.` followed by base64url (no padding) of
//! `nonce (12 bytes) || ciphertext || tag (16 bytes)`. The body is
//! AES-256-GCM under the shared key with the header bound as associated data.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};

/// Required symmetric key length in bytes
pub const KEY_SIZE: usize = 32;

const TOKEN_HEADER: &str = "plam.local.";
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// Errors raised while building, issuing or verifying tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    KeyLength { expected: usize, actual: usize },
    Invalid,
    Expired,
    Encode(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::KeyLength { expected, actual } => write!(
                f,
                "invalid key size: must be exactly {} bytes, got {}",
                expected, actual
            ),
            TokenError::Invalid => write!(f, "token is invalid"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::Encode(reason) => write!(f, "failed to encode token: {}", reason),
        }
    }
}

impl std::error::Error for TokenError {}

/// Authenticated-encryption codec bound to a single symmetric key
pub struct TokenCodec {
    cipher: Aes256Gcm,
}

impl TokenCodec {
    /// Build a codec; the key must be exactly [`KEY_SIZE`] bytes
    pub fn new(key: &[u8]) -> Result<Self, TokenError> {
        if key.len() != KEY_SIZE {
            return Err(TokenError::KeyLength {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }

        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| TokenError::KeyLength {
            expected: KEY_SIZE,
            actual: key.len(),
        })?;

        Ok(Self { cipher })
    }

    /// Serialize and seal `claims` into a token string
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let plaintext =
            serde_json::to_vec(claims).map_err(|e| TokenError::Encode(e.to_string()))?;

        // Fresh nonce per token
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &plaintext,
                    aad: TOKEN_HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Encode("encryption failed".to_string()))?;

        let mut body = Vec::with_capacity(NONCE_SIZE + sealed.len());
        body.extend_from_slice(&nonce);
        body.extend_from_slice(&sealed);

        Ok(format!("{}{}", TOKEN_HEADER, URL_SAFE_NO_PAD.encode(body)))
    }

    /// Open a token and deserialize its claims
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let body = token
            .strip_prefix(TOKEN_HEADER)
            .ok_or(TokenError::Invalid)?;
        let raw = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| TokenError::Invalid)?;

        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(TokenError::Invalid);
        }

        let (nonce, sealed) = raw.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: TOKEN_HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Invalid)?;

        serde_json::from_slice(&plaintext).map_err(|_| TokenError::Invalid)
    }
}
