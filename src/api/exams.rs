// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{extract::{ApiJson, ApiPath}, returned_id};
use crate::{
    auth::{Auth, ProfessorOnly, StudentOnly},
    db::{
        queries::{CREATE_EXAM, DELETE_EXAM, EXAM_QUESTIONS, STORE_PRESENTATION, UPDATE_EXAM},
        Row,
    },
    error::ApiError,
    models::{
        ExamCreatedResponse, ExamRequest, ExamUpdatedResponse, MessageResponse, PresentationRequest,
        PresentationResponse,
    },
    state::AppState,
};

/// List the questions attached to an exam.
#[utoipa::path(
    get,
    path = "/v1/exams/{exam_id}/questions",
    tag = "Exams",
    params(("exam_id" = i64, Path, description = "Exam identifier")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Question rows as JSON objects"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn exam_questions(
    Auth(_user): Auth,
    State(state): State<AppState>,
    ApiPath(exam_id): ApiPath<i64>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let mut unit = state.db.begin().await?;
    let rows = unit
        .run_query(EXAM_QUESTIONS, &[("exam_id", exam_id.into())])
        .await?;
    Ok(Json(rows))
}

/// Create an exam.
#[utoipa::path(
    post,
    path = "/v1/exams",
    tag = "Exams",
    request_body = ExamRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Exam created", body = ExamCreatedResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Professor role required"),
    )
)]
pub async fn create_exam(
    ProfessorOnly(user): ProfessorOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ExamRequest>,
) -> Result<(StatusCode, Json<ExamCreatedResponse>), ApiError> {
    let mut unit = state.db.begin().await?;
    let result = unit
        .call_routine(
            CREATE_EXAM,
            &[
                request.name.into(),
                request.description.into(),
                request.question_count.into(),
                request.time_limit.into(),
                request.course_id.into(),
                request.professor_id.into(),
            ],
        )
        .await?;
    let exam_id = returned_id(CREATE_EXAM, &result)?;
    unit.commit().await?;

    info!(exam_id, professor_id = user.user_id, "Exam created");
    Ok((StatusCode::CREATED, Json(ExamCreatedResponse { exam_id })))
}

/// Replace an exam's definition.
#[utoipa::path(
    put,
    path = "/v1/exams/{exam_id}",
    tag = "Exams",
    params(("exam_id" = i64, Path, description = "Exam identifier")),
    request_body = ExamRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Exam updated", body = ExamUpdatedResponse),
        (status = 404, description = "Exam not found"),
    )
)]
pub async fn update_exam(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(exam_id): ApiPath<i64>,
    ApiJson(request): ApiJson<ExamRequest>,
) -> Result<Json<ExamUpdatedResponse>, ApiError> {
    let mut unit = state.db.begin().await?;
    let result = unit
        .call_routine(
            UPDATE_EXAM,
            &[
                exam_id.into(),
                request.name.into(),
                request.description.into(),
                request.question_count.into(),
                request.time_limit.into(),
                request.course_id.into(),
                request.professor_id.into(),
            ],
        )
        .await?;
    let rows_affected = returned_id(UPDATE_EXAM, &result)?;

    if rows_affected == 0 {
        return Err(ApiError::not_found("Exam not found"));
    }

    unit.commit().await?;
    info!(exam_id, "Exam updated");
    Ok(Json(ExamUpdatedResponse { rows_affected }))
}

/// Delete an exam that is not assigned to any schedule.
#[utoipa::path(
    delete,
    path = "/v1/exams/{exam_id}",
    tag = "Exams",
    params(("exam_id" = i64, Path, description = "Exam identifier")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Exam deleted", body = MessageResponse),
        (status = 409, description = "Exam is assigned to a schedule"),
    )
)]
pub async fn delete_exam(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(exam_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut unit = state.db.begin().await?;
    let result = unit.call_routine(DELETE_EXAM, &[exam_id.into()]).await?;

    if returned_id(DELETE_EXAM, &result)? == 0 {
        return Err(ApiError::conflict(
            "Exam is assigned to a schedule and cannot be deleted",
        ));
    }

    unit.commit().await?;
    info!(exam_id, "Exam deleted");
    Ok(Json(MessageResponse::new("Exam deleted")))
}

/// Store a student's exam submission.
///
/// Students may only submit on their own behalf.
#[utoipa::path(
    post,
    path = "/v1/exams/{exam_id}/presentations",
    tag = "Exams",
    params(("exam_id" = i64, Path, description = "Exam identifier")),
    request_body = PresentationRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Presentation stored", body = PresentationResponse),
        (status = 403, description = "Student role required, submitting for self"),
    )
)]
pub async fn submit_presentation(
    StudentOnly(user): StudentOnly,
    State(state): State<AppState>,
    ApiPath(exam_id): ApiPath<i64>,
    ApiJson(request): ApiJson<PresentationRequest>,
) -> Result<(StatusCode, Json<PresentationResponse>), ApiError> {
    if request.student_id != user.user_id {
        return Err(ApiError::forbidden(
            "Students can only submit their own presentations",
        ));
    }

    let mut unit = state.db.begin().await?;
    let result = unit
        .call_routine(
            STORE_PRESENTATION,
            &[
                request.student_id.into(),
                exam_id.into(),
                request.presented_at.into(),
                request.time_taken.into(),
                request.ip_address.into(),
                request.answers.into(),
            ],
        )
        .await?;
    let presentation_id = returned_id(STORE_PRESENTATION, &result)?;
    unit.commit().await?;

    info!(exam_id, presentation_id, student_id = user.user_id, "Presentation stored");
    Ok((
        StatusCode::CREATED,
        Json(PresentationResponse {
            message: "Presentation stored".to_string(),
            presentation_id,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::db::SqlValue;
    use crate::testutil::{row, test_state};

    fn professor() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: 7,
            role: Role::Professor,
            expires_at: 0,
        }
    }

    fn student(user_id: i64) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            role: Role::Student,
            expires_at: 0,
        }
    }

    fn exam() -> ExamRequest {
        ExamRequest {
            name: "Midterm".to_string(),
            description: "Chapters 1-4".to_string(),
            question_count: 10,
            time_limit: 60,
            course_id: 3,
            professor_id: 7,
        }
    }

    fn presentation(student_id: i64) -> PresentationRequest {
        PresentationRequest {
            student_id,
            presented_at: "2024-05-01 10:00".to_string(),
            time_taken: "00:45".to_string(),
            answers: "[1,2,3]".to_string(),
            ip_address: None,
        }
    }

    #[tokio::test]
    async fn create_exam_commits_and_returns_id() {
        let (state, db) = test_state();
        db.returns(CREATE_EXAM, 55_i64);

        let (status, Json(response)) = create_exam(ProfessorOnly(professor()), State(state), ApiJson(exam()))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.exam_id, 55);
        assert_eq!(db.commits(), 1);

        let calls = db.routine_calls();
        assert_eq!(calls[0].1.len(), 6);
        assert_eq!(calls[0].1[0], SqlValue::Text("Midterm".into()));
        assert_eq!(calls[0].1[5], SqlValue::Int(7));
    }

    #[tokio::test]
    async fn update_exam_passes_id_first_and_maps_zero_rows_to_404() {
        let (state, db) = test_state();
        db.returns(UPDATE_EXAM, 0_i64);

        let err = update_exam(ProfessorOnly(professor()), State(state), ApiPath(12), ApiJson(exam()))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(db.commits(), 0);
        assert_eq!(db.rollbacks(), 1);
        assert_eq!(db.routine_calls()[0].1[0], SqlValue::Int(12));
    }

    #[tokio::test]
    async fn update_exam_reports_rows_affected() {
        let (state, db) = test_state();
        db.returns(UPDATE_EXAM, 1_i64);

        let Json(response) = update_exam(ProfessorOnly(professor()), State(state), ApiPath(12), ApiJson(exam()))
            .await
            .unwrap();
        assert_eq!(response.rows_affected, 1);
        assert_eq!(db.commits(), 1);
    }

    #[tokio::test]
    async fn delete_exam_on_schedule_is_conflict() {
        let (state, db) = test_state();
        db.returns(DELETE_EXAM, 0_i64);

        let err = delete_exam(ProfessorOnly(professor()), State(state), ApiPath(12))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(db.commits(), 0);
    }

    #[tokio::test]
    async fn delete_exam_succeeds() {
        let (state, db) = test_state();
        db.returns(DELETE_EXAM, 1_i64);

        let Json(response) = delete_exam(ProfessorOnly(professor()), State(state), ApiPath(12))
            .await
            .unwrap();
        assert_eq!(response.message, "Exam deleted");
        assert_eq!(db.commits(), 1);
    }

    #[tokio::test]
    async fn presentation_for_another_student_is_forbidden() {
        let (state, db) = test_state();

        let err = submit_presentation(StudentOnly(student(42)), State(state), ApiPath(9), ApiJson(presentation(43)))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(db.begun(), 0);
    }

    #[tokio::test]
    async fn presentation_is_stored_with_null_ip() {
        let (state, db) = test_state();
        db.returns(STORE_PRESENTATION, 300_i64);

        let (status, Json(response)) =
            submit_presentation(StudentOnly(student(42)), State(state), ApiPath(9), ApiJson(presentation(42)))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response.presentation_id, 300);
        assert_eq!(db.commits(), 1);

        let args = &db.routine_calls()[0].1;
        assert_eq!(args[0], SqlValue::Int(42));
        assert_eq!(args[1], SqlValue::Int(9));
        assert_eq!(args[4], SqlValue::Null);
    }

    #[tokio::test]
    async fn exam_questions_returns_rows() {
        let (state, db) = test_state();
        db.with_rows(vec![row(serde_json::json!({"id_pregunta": 1, "texto": "2 + 2?"}))]);

        let Json(rows) = exam_questions(Auth(student(42)), State(state), ApiPath(9)).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["texto"], "2 + 2?");
        let queries = db.queries();
        assert_eq!(queries[0].1, vec![("exam_id".to_string(), SqlValue::Int(9))]);
    }
}
