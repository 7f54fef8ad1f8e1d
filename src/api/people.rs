// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Student and professor account management.
//!
//! Both account kinds go through the same create/update/delete routines
//! shape, `(id, name, password) -> bool` and `(id) -> bool`.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{extract::{ApiJson, ApiPath}, routine_succeeded};
use crate::{
    auth::ProfessorOnly,
    db::queries::{
        CREATE_PROFESSOR, CREATE_STUDENT, DELETE_PROFESSOR, DELETE_STUDENT, UPDATE_PROFESSOR,
        UPDATE_STUDENT,
    },
    error::ApiError,
    models::{MessageResponse, PersonRequest, UpdatePersonRequest},
    state::AppState,
};

struct AccountKind {
    title: &'static str,
    create: &'static str,
    update: &'static str,
    delete: &'static str,
}

const STUDENT: AccountKind = AccountKind {
    title: "Student",
    create: CREATE_STUDENT,
    update: UPDATE_STUDENT,
    delete: DELETE_STUDENT,
};

const PROFESSOR: AccountKind = AccountKind {
    title: "Professor",
    create: CREATE_PROFESSOR,
    update: UPDATE_PROFESSOR,
    delete: DELETE_PROFESSOR,
};

async fn create_account(
    state: &AppState,
    kind: &AccountKind,
    request: PersonRequest,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let id = request.id;
    let mut unit = state.db.begin().await?;
    let created = unit
        .call_routine(kind.create, &[id.into(), request.name.into(), request.password.into()])
        .await?;

    if !routine_succeeded(&created) {
        return Err(ApiError::conflict(format!(
            "{} {id} already exists",
            kind.title
        )));
    }

    unit.commit().await?;
    info!(account = kind.title, id, "Account created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!("{} created", kind.title))),
    ))
}

async fn update_account(
    state: &AppState,
    kind: &AccountKind,
    id: i64,
    request: UpdatePersonRequest,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut unit = state.db.begin().await?;
    let updated = unit
        .call_routine(kind.update, &[id.into(), request.name.into(), request.password.into()])
        .await?;

    if !routine_succeeded(&updated) {
        return Err(ApiError::not_found(format!("{} {id} not found", kind.title)));
    }

    unit.commit().await?;
    info!(account = kind.title, id, "Account updated");
    Ok(Json(MessageResponse::new(format!("{} updated", kind.title))))
}

async fn delete_account(
    state: &AppState,
    kind: &AccountKind,
    id: i64,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut unit = state.db.begin().await?;
    let deleted = unit.call_routine(kind.delete, &[id.into()]).await?;

    if !routine_succeeded(&deleted) {
        return Err(ApiError::not_found(format!("{} {id} not found", kind.title)));
    }

    unit.commit().await?;
    info!(account = kind.title, id, "Account deleted");
    Ok(Json(MessageResponse::new(format!("{} deleted", kind.title))))
}

// =============================================================================
// Students
// =============================================================================

#[utoipa::path(
    post,
    path = "/v1/students",
    tag = "Students",
    request_body = PersonRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Student created", body = MessageResponse),
        (status = 409, description = "Student already exists"),
    )
)]
pub async fn create_student(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PersonRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    create_account(&state, &STUDENT, request).await
}

#[utoipa::path(
    put,
    path = "/v1/students/{student_id}",
    tag = "Students",
    params(("student_id" = i64, Path, description = "Student identifier")),
    request_body = UpdatePersonRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Student updated", body = MessageResponse),
        (status = 404, description = "Student not found"),
    )
)]
pub async fn update_student(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdatePersonRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    update_account(&state, &STUDENT, student_id, request).await
}

#[utoipa::path(
    delete,
    path = "/v1/students/{student_id}",
    tag = "Students",
    params(("student_id" = i64, Path, description = "Student identifier")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 404, description = "Student not found"),
    )
)]
pub async fn delete_student(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_account(&state, &STUDENT, student_id).await
}

// =============================================================================
// Professors
// =============================================================================

#[utoipa::path(
    post,
    path = "/v1/professors",
    tag = "Professors",
    request_body = PersonRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Professor created", body = MessageResponse),
        (status = 409, description = "Professor already exists"),
    )
)]
pub async fn create_professor(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PersonRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    create_account(&state, &PROFESSOR, request).await
}

#[utoipa::path(
    put,
    path = "/v1/professors/{professor_id}",
    tag = "Professors",
    params(("professor_id" = i64, Path, description = "Professor identifier")),
    request_body = UpdatePersonRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Professor updated", body = MessageResponse),
        (status = 404, description = "Professor not found"),
    )
)]
pub async fn update_professor(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(professor_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdatePersonRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    update_account(&state, &PROFESSOR, professor_id, request).await
}

#[utoipa::path(
    delete,
    path = "/v1/professors/{professor_id}",
    tag = "Professors",
    params(("professor_id" = i64, Path, description = "Professor identifier")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Professor deleted", body = MessageResponse),
        (status = 404, description = "Professor not found"),
    )
)]
pub async fn delete_professor(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(professor_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_account(&state, &PROFESSOR, professor_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::db::SqlValue;
    use crate::testutil::test_state;

    fn caller() -> ProfessorOnly {
        ProfessorOnly(AuthenticatedUser {
            user_id: 7,
            role: Role::Professor,
            expires_at: 0,
        })
    }

    fn person(id: i64) -> PersonRequest {
        PersonRequest {
            id,
            name: "Ada".to_string(),
            password: "secret".to_string(),
        }
    }

    fn rename() -> UpdatePersonRequest {
        UpdatePersonRequest {
            name: "Ada L.".to_string(),
            password: "secret2".to_string(),
        }
    }

    #[tokio::test]
    async fn create_student_commits() {
        let (state, db) = test_state();
        db.returns(CREATE_STUDENT, true);

        let (status, Json(response)) = create_student(caller(), State(state), ApiJson(person(42)))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.message, "Student created");
        assert_eq!(db.commits(), 1);
        assert_eq!(
            db.routine_calls()[0].1,
            vec![
                SqlValue::Int(42),
                SqlValue::Text("Ada".into()),
                SqlValue::Text("secret".into())
            ]
        );
    }

    #[tokio::test]
    async fn duplicate_student_is_conflict() {
        let (state, db) = test_state();
        db.returns(CREATE_STUDENT, false);

        let err = create_student(caller(), State(state), ApiJson(person(42)))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(db.commits(), 0);
        assert_eq!(db.rollbacks(), 1);
    }

    #[tokio::test]
    async fn missing_student_update_is_not_found() {
        let (state, db) = test_state();
        db.returns(UPDATE_STUDENT, false);

        let err = update_student(caller(), State(state), ApiPath(42), ApiJson(rename()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_student_succeeds() {
        let (state, db) = test_state();
        db.returns(DELETE_STUDENT, true);

        let Json(response) = delete_student(caller(), State(state), ApiPath(42)).await.unwrap();
        assert_eq!(response.message, "Student deleted");
        assert_eq!(db.routine_calls()[0].1, vec![SqlValue::Int(42)]);
    }

    #[tokio::test]
    async fn professor_routines_are_used_for_professors() {
        let (state, db) = test_state();
        db.returns(CREATE_PROFESSOR, true)
            .returns(UPDATE_PROFESSOR, true)
            .returns(DELETE_PROFESSOR, false);

        create_professor(caller(), State(state.clone()), ApiJson(person(8)))
            .await
            .unwrap();
        update_professor(caller(), State(state.clone()), ApiPath(8), ApiJson(rename()))
            .await
            .unwrap();
        let err = delete_professor(caller(), State(state), ApiPath(8)).await.unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let names: Vec<String> = db.routine_calls().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec![CREATE_PROFESSOR, UPDATE_PROFESSOR, DELETE_PROFESSOR]);
        assert_eq!(db.commits(), 2);
    }
}
