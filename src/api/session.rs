// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, logout and the authenticated welcome endpoint.

use axum::{extract::State, Json};
use tracing::{info, warn};

use super::extract::ApiJson;
use crate::{
    auth::{Auth, BearerToken, Role},
    db::queries::{LOGIN_PROFESSOR, LOGIN_STUDENT},
    error::ApiError,
    models::{LoginRequest, MessageResponse, TokenResponse},
    state::AppState,
};

/// Exchange credentials for a session token.
///
/// The role flag is validated before any database work.
#[utoipa::path(
    post,
    path = "/v1/login",
    request_body = LoginRequest,
    tag = "Session",
    responses(
        (status = 200, description = "Session token", body = TokenResponse),
        (status = 400, description = "is_professor is neither 0 nor 1"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let role = Role::from_flag(request.is_professor).ok_or_else(|| {
        ApiError::bad_request("is_professor must be 0 for student or 1 for professor")
    })?;

    let routine = match role {
        Role::Professor => LOGIN_PROFESSOR,
        Role::Student => LOGIN_STUDENT,
    };

    let mut unit = state.db.begin().await?;
    let result = unit
        .call_routine(routine, &[request.id.into(), request.password.into()])
        .await?;

    if result.as_i64() != Some(1) {
        warn!(user_id = request.id, %role, "Login rejected");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.auth.codec().issue(request.id, role).map_err(|e| {
        tracing::error!(error = %e, "Failed to issue session token");
        ApiError::internal("Failed to issue session token")
    })?;

    info!(user_id = request.id, %role, "Login succeeded");
    Ok(Json(TokenResponse { token }))
}

/// Revoke the presented token.
///
/// Always answers 200; only tokens that still verify are recorded.
#[utoipa::path(
    post,
    path = "/v1/logout",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "No bearer credential"),
    )
)]
pub async fn logout(State(state): State<AppState>, BearerToken(token): BearerToken) -> Json<MessageResponse> {
    state.auth.revoke(&token);
    Json(MessageResponse::new("Logged out successfully"))
}

/// Greet the authenticated caller by role.
#[utoipa::path(
    get,
    path = "/v1/protected",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse),
        (status = 401, description = "Unauthorized - invalid, expired or revoked token"),
    )
)]
pub async fn welcome(Auth(user): Auth) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!(
        "Welcome, {} {}!",
        user.role, user.user_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::db::SqlValue;
    use crate::testutil::test_state;
    use axum::http::StatusCode;

    fn credentials(id: i64, is_professor: i64) -> LoginRequest {
        LoginRequest {
            id,
            password: "x".to_string(),
            is_professor,
        }
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_student() {
        let (state, db) = test_state();
        db.returns(LOGIN_STUDENT, 1_i64);

        let Json(response) = login(State(state.clone()), ApiJson(credentials(42, 0)))
            .await
            .expect("login succeeds");

        let user = state.auth.authenticate(&response.token).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.role, Role::Student);

        let calls = db.routine_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, LOGIN_STUDENT);
        assert_eq!(calls[0].1, vec![SqlValue::Int(42), SqlValue::Text("x".into())]);
    }

    #[tokio::test]
    async fn login_uses_professor_routine_for_flag_one() {
        let (state, db) = test_state();
        db.returns(LOGIN_PROFESSOR, 1_i64);

        let Json(response) = login(State(state.clone()), ApiJson(credentials(7, 1)))
            .await
            .expect("login succeeds");

        assert!(state.auth.authenticate(&response.token).unwrap().is_professor());
        assert_eq!(db.routine_calls()[0].0, LOGIN_PROFESSOR);
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let (state, db) = test_state();
        db.returns(LOGIN_STUDENT, 0_i64);

        let err = login(State(state), ApiJson(credentials(42, 0))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_rejects_invalid_role_flag_before_database() {
        let (state, db) = test_state();

        let err = login(State(state), ApiJson(credentials(42, 2))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(db.begun(), 0);
        assert!(db.routine_calls().is_empty());
    }

    #[tokio::test]
    async fn login_database_failure_is_opaque_500() {
        let (state, db) = test_state();
        db.fails(LOGIN_STUDENT, "ORA-00942: table or view does not exist");

        let err = login(State(state), ApiJson(credentials(42, 0))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("ORA-"));
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let (state, _db) = test_state();
        let token = state.auth.codec().issue(42, Role::Student).unwrap();

        let Json(response) = logout(State(state.clone()), BearerToken(token.clone())).await;
        assert_eq!(response.message, "Logged out successfully");
        assert!(state.auth.revocations().is_revoked(&token));
    }

    #[tokio::test]
    async fn logout_with_unverifiable_token_stores_nothing() {
        let (state, _db) = test_state();
        let junk = "x".repeat(4096);

        for _ in 0..3 {
            let Json(response) = logout(State(state.clone()), BearerToken(junk.clone())).await;
            assert_eq!(response.message, "Logged out successfully");
        }
        assert!(state.auth.revocations().is_empty());
    }

    #[tokio::test]
    async fn welcome_is_role_aware() {
        let professor = AuthenticatedUser {
            user_id: 7,
            role: Role::Professor,
            expires_at: 0,
        };
        let Json(response) = welcome(Auth(professor)).await;
        assert_eq!(response.message, "Welcome, professor 7!");

        let student = AuthenticatedUser {
            user_id: 42,
            role: Role::Student,
            expires_at: 0,
        };
        let Json(response) = welcome(Auth(student)).await;
        assert_eq!(response.message, "Welcome, student 42!");
    }
}
