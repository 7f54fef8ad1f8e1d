// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! Extractors run before the handler body, so a rejected request never
//! acquires a database work unit.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;

/// Raw bearer credential from the Authorization header, unverified.
///
/// Logout uses this and lets the gate decide whether to record it.
pub struct BearerToken(pub String);

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Auth schemes are case-insensitive (RFC 9110 section 11.1).
        let token = auth_header
            .trim_start()
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        Ok(BearerToken(token.to_string()))
    }
}

/// Extractor for authenticated users.
///
/// Validates the session token from the Authorization header against the
/// gate in `AppState`.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_semesters(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<Row>>, ApiError> {
///     // user.user_id contains the caller's account id
///     // user.role contains their role
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user = state.auth.authenticate(&token)?;
        Ok(Auth(user))
    }
}

/// Extractor that requires the professor role.
pub struct ProfessorOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for ProfessorOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if user.role != Role::Professor {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(ProfessorOnly(user))
    }
}

/// Extractor that requires the student role.
pub struct StudentOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for StudentOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if user.role != Role::Student {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(StudentOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_state;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _db) = test_state();
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_scheme() {
        let (state, _db) = test_state();
        let mut parts = parts_with(Some("Basic dXNlcjpwYXNz"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let (state, _db) = test_state();
        let token = state.auth.codec().issue(42, Role::Student).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.role, Role::Student);
    }

    #[tokio::test]
    async fn auth_extractor_rejects_revoked_token() {
        let (state, _db) = test_state();
        let token = state.auth.codec().issue(42, Role::Student).unwrap();
        state.auth.revoke(&token);
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenRevoked)));
    }

    #[tokio::test]
    async fn professor_only_rejects_student() {
        let (state, _db) = test_state();
        let token = state.auth.codec().issue(42, Role::Student).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let result = ProfessorOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn student_only_rejects_professor() {
        let (state, _db) = test_state();
        let token = state.auth.codec().issue(7, Role::Professor).unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));

        let result = StudentOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn bearer_scheme_is_case_insensitive() {
        let (state, _db) = test_state();
        let token = state.auth.codec().issue(42, Role::Student).unwrap();

        for scheme in ["bearer", "BEARER", "Bearer"] {
            let mut parts = parts_with(Some(&format!("{scheme} {token}")));
            let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
            assert_eq!(user.user_id, 42);
        }
    }

    #[tokio::test]
    async fn bearer_scheme_without_token_is_rejected() {
        let (state, _db) = test_state();

        for header in ["Bearer", "Bearer   ", "bearertoken"] {
            let mut parts = parts_with(Some(header));
            let result = BearerToken::from_request_parts(&mut parts, &state).await;
            assert!(matches!(result, Err(AuthError::InvalidAuthHeader)), "{header}");
        }
    }

    #[tokio::test]
    async fn bearer_token_does_not_verify() {
        let (state, _db) = test_state();
        let mut parts = parts_with(Some("Bearer whatever"));

        let BearerToken(token) = BearerToken::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(token, "whatever");
    }
}
