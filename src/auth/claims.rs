// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried by a session token.
///
/// Field names follow the payload issued at login: `user_id` is the
/// account's numeric identifier and `is_professor` the role flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (student or professor identifier)
    pub user_id: i64,

    /// Role flag (`true` for professors)
    pub is_professor: bool,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated user information extracted from a session token.
///
/// This is the type handlers receive from the `Auth` extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Account identifier
    pub user_id: i64,

    /// User's role
    pub role: Role,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified session claims.
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: Role::from_privileged(claims.is_professor),
            expires_at: claims.exp,
        }
    }

    /// Check if this user is a professor.
    pub fn is_professor(&self) -> bool {
        self.role.is_privileged()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> SessionClaims {
        SessionClaims {
            user_id: 42,
            is_professor: true,
            iat: 1700000000,
            exp: 1700003600,
        }
    }

    #[test]
    fn from_claims_extracts_user_id_and_expiry() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.user_id, 42);
        assert_eq!(user.expires_at, 1700003600);
    }

    #[test]
    fn from_claims_maps_role_flag() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.role, Role::Professor);
        assert!(user.is_professor());

        let mut claims = sample_claims();
        claims.is_professor = false;
        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.role, Role::Student);
        assert!(!user.is_professor());
    }

    #[test]
    fn claims_use_login_payload_field_names() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        assert_eq!(json["user_id"], 42);
        assert_eq!(json["is_professor"], true);
        assert_eq!(json["exp"], 1700003600);
    }
}
