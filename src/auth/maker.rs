//! Token Maker
//! Mission: Mint and authoritatively accept access tokens

use crate::auth::codec::{TokenCodec, TokenError};
use crate::auth::models::{Payload, UserRole};
use chrono::{Duration, Utc};
use tracing::debug;

/// Issues and verifies access tokens under one immutable symmetric key
pub struct TokenMaker {
    codec: TokenCodec,
}

impl TokenMaker {
    /// Create a maker; fails with `KeyLength` unless the key is 32 bytes
    pub fn new(symmetric_key: &[u8]) -> Result<Self, TokenError> {
        Ok(Self {
            codec: TokenCodec::new(symmetric_key)?,
        })
    }

    /// Issue a token for `username` valid for `duration`
    pub fn create_token(
        &self,
        username: &str,
        role: UserRole,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(username, role, duration);

        debug!(
            token_id = %payload.id(),
            username = payload.username(),
            role = role.as_str(),
            "Issuing access token"
        );

        let token = self.codec.encode(&payload)?;
        Ok((token, payload))
    }

    /// Verify a token and return its claims if it is authentic and unexpired
    pub fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let payload: Payload = self.codec.decode(token)?;

        if payload.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const KEY: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz012345";
    const OTHER_KEY: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";

    #[test]
    fn test_token_generation_and_validation() {
        let maker = TokenMaker::new(KEY).unwrap();

        let (token, issued) = maker
            .create_token("alice", UserRole::User, Duration::minutes(1))
            .unwrap();
        assert!(!token.is_empty());

        let verified = maker.verify_token(&token).unwrap();
        assert_eq!(verified, issued);
        assert_eq!(verified.username(), "alice");
        assert_eq!(verified.role(), UserRole::User);
        assert_eq!(verified.issued_at(), issued.issued_at());
        assert_eq!(verified.expired_at(), issued.expired_at());
    }

    #[test]
    fn test_expired_token_rejected() {
        let maker = TokenMaker::new(KEY).unwrap();
        let (token, payload) = maker
            .create_token("alice", UserRole::Admin, -Duration::seconds(1))
            .unwrap();
        assert!(payload.expired_at() < payload.issued_at());

        assert_eq!(maker.verify_token(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_zero_duration_token_rejected() {
        let maker = TokenMaker::new(KEY).unwrap();
        let (token, _) = maker
            .create_token("alice", UserRole::User, Duration::zero())
            .unwrap();

        assert_eq!(maker.verify_token(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_long_lived_token_accepted() {
        let maker = TokenMaker::new(KEY).unwrap();
        let (token, _) = maker
            .create_token("alice", UserRole::User, Duration::days(365))
            .unwrap();

        assert!(maker.verify_token(&token).is_ok());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let maker = TokenMaker::new(KEY).unwrap();
        assert_eq!(
            maker.verify_token("invalid.token.here").unwrap_err(),
            TokenError::Invalid
        );
    }

    #[test]
    fn test_different_keys_reject() {
        let maker1 = TokenMaker::new(KEY).unwrap();
        let maker2 = TokenMaker::new(OTHER_KEY).unwrap();

        let (token, _) = maker1
            .create_token("alice", UserRole::User, Duration::minutes(1))
            .unwrap();

        assert_eq!(maker2.verify_token(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn test_every_tampered_character_rejected() {
        let maker = TokenMaker::new(KEY).unwrap();
        let (token, _) = maker
            .create_token("alice", UserRole::User, Duration::minutes(1))
            .unwrap();

        for index in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            // Stay inside the base64url alphabet so only the content changes
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(
                maker.verify_token(&tampered).unwrap_err(),
                TokenError::Invalid,
                "tampering at {} was accepted",
                index
            );
        }
    }

    #[test]
    fn test_short_key_rejected() {
        assert!(matches!(
            TokenMaker::new(b"0123456789"),
            Err(TokenError::KeyLength {
                expected: 32,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_concurrent_issue_and_verify() {
        let maker = Arc::new(TokenMaker::new(KEY).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let maker = maker.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let name = format!("user{}", i);
                        let (token, issued) = maker
                            .create_token(&name, UserRole::User, Duration::minutes(5))
                            .unwrap();
                        let verified = maker.verify_token(&token).unwrap();
                        assert_eq!(verified, issued);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
