// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request authentication gate.
//!
//! Combines the [`TokenCodec`] and a [`RevocationStore`]. A bearer token is
//! accepted only if its signature verifies against this process's secret,
//! its expiration is strictly in the future, and it has not been revoked.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::codec::TokenCodec;
use super::revocation::RevocationStore;
use super::{AuthError, AuthenticatedUser};

#[derive(Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    revocations: Arc<dyn RevocationStore>,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self { codec, revocations }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }

    /// Authenticate a bearer credential.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.authenticate_at(token, Utc::now())
    }

    /// Authenticate as if the current time were `now`.
    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.codec.parse(token).map_err(|e| {
            tracing::debug!(token = %fingerprint(token), error = %e, "Token rejected");
            AuthError::from(e)
        })?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        if self.revocations.is_revoked(token) {
            tracing::debug!(token = %fingerprint(token), "Revoked token presented");
            return Err(AuthError::TokenRevoked);
        }

        Ok(AuthenticatedUser::from_claims(claims))
    }

    /// Invalidate a token until its expiration.
    ///
    /// Only tokens that verify are recorded; anything else is already
    /// rejected by the codec. Returns whether an entry was stored.
    pub fn revoke(&self, token: &str) -> bool {
        let claims = match self.codec.parse(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(token = %fingerprint(token), error = %e, "Nothing to revoke");
                return false;
            }
        };
        let Some(expires_at) = DateTime::<Utc>::from_timestamp(claims.exp, 0) else {
            return false;
        };

        self.revocations.revoke(token, expires_at);
        tracing::info!(token = %fingerprint(token), user_id = claims.user_id, "Token revoked");
        true
    }
}

/// Short, non-reversible token identifier for logs.
pub fn fingerprint(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect()
}
