// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token codec.
//!
//! Tokens are HS256 JWTs signed with a secret generated once per process.
//! Restarting the server therefore invalidates every issued token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};

use super::claims::SessionClaims;
use super::roles::Role;

/// Length of the generated signing secret in bytes.
const SECRET_LEN: usize = 32;

/// Default session lifetime (1 hour).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(1);

/// Token verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Signature is valid but the expiration has passed
    #[error("token has expired")]
    Expired,
    /// Tampered payload, foreign secret, or not a token at all
    #[error("token is malformed or its signature is invalid")]
    Invalid,
    /// The signer itself failed
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Issues and verifies session tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec with a fresh random secret from the system CSPRNG.
    pub fn generate(ttl: Duration) -> Result<Self, TokenError> {
        let mut secret = [0u8; SECRET_LEN];
        SystemRandom::new()
            .fill(&mut secret)
            .map_err(|_| TokenError::Signing("system random source unavailable".to_string()))?;
        Ok(Self::from_secret(&secret, ttl))
    }

    /// Create a codec from a known secret.
    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Session lifetime applied at issuance.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id` expiring one TTL from now.
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: i64, role: Role, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("token expiration is out of range".to_string()))?;

        let claims = SessionClaims {
            user_id,
            is_professor: role.is_privileged(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify the signature and expiration, then decode the claims.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
