// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Question authoring and the professor question bank.
//!
//! Listings are scoped to the calling professor: the `professor_id` in the
//! path must match the token subject.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{
    extract::{ApiJson, ApiPath, ApiQuery},
    require_self, returned_id,
};
use crate::{
    auth::ProfessorOnly,
    db::{
        queries::{
            professor_questions, professor_questions_by_topic, question_bank, CREATE_QUESTION,
            DELETE_QUESTION, LINK_QUESTION_TO_EXAM, UPDATE_QUESTION, UPDATE_QUESTION_PRIVACY,
        },
        Row,
    },
    error::ApiError,
    models::{
        CreateQuestionRequest, MessageResponse, QuestionCreatedResponse, QuestionPrivacyRequest,
        TopicQuery, UpdateQuestionRequest,
    },
    state::AppState,
};

/// Topic stored when the caller leaves it out.
pub const DEFAULT_TOPIC: &str = "No definido";

fn topic_or_default(topic: Option<String>) -> String {
    topic.unwrap_or_else(|| DEFAULT_TOPIC.to_string())
}

/// Create a question and attach it to an exam.
///
/// Both steps share one transaction.
#[utoipa::path(
    post,
    path = "/v1/questions",
    tag = "Questions",
    request_body = CreateQuestionRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Question created", body = QuestionCreatedResponse),
        (status = 403, description = "Professor role required"),
    )
)]
pub async fn create_question(
    ProfessorOnly(user): ProfessorOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<QuestionCreatedResponse>), ApiError> {
    let mut unit = state.db.begin().await?;
    let result = unit
        .call_routine(
            CREATE_QUESTION,
            &[
                request.text.into(),
                request.options.into(),
                request.correct_answers.into(),
                request.type_id.into(),
                topic_or_default(request.topic).into(),
                request.privacy.into(),
            ],
        )
        .await?;
    let question_id = returned_id(CREATE_QUESTION, &result)?;

    unit.execute(
        LINK_QUESTION_TO_EXAM,
        &[
            ("exam_id", request.exam_id.into()),
            ("question_id", question_id.into()),
        ],
    )
    .await?;
    unit.commit().await?;

    info!(
        question_id,
        exam_id = request.exam_id,
        professor_id = user.user_id,
        "Question created"
    );
    Ok((
        StatusCode::CREATED,
        Json(QuestionCreatedResponse {
            message: "Question created".to_string(),
            question_id,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/v1/questions/{question_id}",
    tag = "Questions",
    params(("question_id" = i64, Path, description = "Question identifier")),
    request_body = UpdateQuestionRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Question updated", body = MessageResponse),
        (status = 403, description = "Professor role required"),
    )
)]
pub async fn update_question(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(question_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateQuestionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut unit = state.db.begin().await?;
    // The routine reports nothing useful; failures surface as errors.
    unit.call_routine(
        UPDATE_QUESTION,
        &[
            question_id.into(),
            request.text.into(),
            request.options.into(),
            request.correct_answers.into(),
            request.type_id.into(),
            topic_or_default(request.topic).into(),
            request.privacy.into(),
        ],
    )
    .await?;
    unit.commit().await?;

    info!(question_id, "Question updated");
    Ok(Json(MessageResponse::new("Question updated")))
}

/// Change whether a question is visible to other professors.
#[utoipa::path(
    put,
    path = "/v1/questions/{question_id}/privacy",
    tag = "Questions",
    params(("question_id" = i64, Path, description = "Question identifier")),
    request_body = QuestionPrivacyRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Privacy updated", body = MessageResponse),
        (status = 403, description = "Not the calling professor"),
        (status = 409, description = "Privacy change refused"),
    )
)]
pub async fn update_question_privacy(
    ProfessorOnly(user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(question_id): ApiPath<i64>,
    ApiJson(request): ApiJson<QuestionPrivacyRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_self(&user, request.professor_id)?;

    let mut unit = state.db.begin().await?;
    let result = unit
        .call_routine(
            UPDATE_QUESTION_PRIVACY,
            &[
                question_id.into(),
                request.professor_id.into(),
                request.privacy.into(),
            ],
        )
        .await?;

    if result.as_i64() != Some(1) {
        return Err(ApiError::conflict("Question privacy could not be changed"));
    }

    unit.commit().await?;
    info!(question_id, privacy = request.privacy, "Question privacy updated");
    Ok(Json(MessageResponse::new("Question privacy updated")))
}

#[utoipa::path(
    delete,
    path = "/v1/questions/{question_id}",
    tag = "Questions",
    params(("question_id" = i64, Path, description = "Question identifier")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Question deleted", body = MessageResponse),
        (status = 409, description = "Question is assigned to exams"),
    )
)]
pub async fn delete_question(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(question_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut unit = state.db.begin().await?;
    let result = unit
        .call_routine(DELETE_QUESTION, &[question_id.into()])
        .await?;

    if result.as_i64() != Some(1) {
        return Err(ApiError::conflict(
            "Question is assigned to exams and cannot be deleted",
        ));
    }

    unit.commit().await?;
    info!(question_id, "Question deleted");
    Ok(Json(MessageResponse::new("Question deleted")))
}

/// Public questions on a topic plus the caller's own.
#[utoipa::path(
    get,
    path = "/v1/question-bank/{professor_id}",
    tag = "Questions",
    params(
        ("professor_id" = i64, Path, description = "Calling professor"),
        TopicQuery,
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Question rows as JSON objects"),
        (status = 403, description = "Not the calling professor"),
    )
)]
pub async fn list_question_bank(
    ProfessorOnly(user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(professor_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<TopicQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    require_self(&user, professor_id)?;

    let mut unit = state.db.begin().await?;
    let rows = unit
        .run_query(
            &question_bank(),
            &[
                ("topic", topic_or_default(query.topic).into()),
                ("professor_id", professor_id.into()),
            ],
        )
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/v1/professors/{professor_id}/private-questions",
    tag = "Questions",
    params(
        ("professor_id" = i64, Path, description = "Calling professor"),
        TopicQuery,
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Question rows as JSON objects"),
        (status = 403, description = "Not the calling professor"),
    )
)]
pub async fn list_private_questions(
    ProfessorOnly(user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(professor_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<TopicQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    require_self(&user, professor_id)?;

    let mut unit = state.db.begin().await?;
    let rows = unit
        .run_query(
            &professor_questions_by_topic(),
            &[
                ("topic", topic_or_default(query.topic).into()),
                ("professor_id", professor_id.into()),
            ],
        )
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/v1/professors/{professor_id}/questions",
    tag = "Questions",
    params(("professor_id" = i64, Path, description = "Calling professor")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Question rows as JSON objects"),
        (status = 403, description = "Not the calling professor"),
    )
)]
pub async fn list_professor_questions(
    ProfessorOnly(user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(professor_id): ApiPath<i64>,
) -> Result<Json<Vec<Row>>, ApiError> {
    require_self(&user, professor_id)?;

    let mut unit = state.db.begin().await?;
    let rows = unit
        .run_query(&professor_questions(), &[("professor_id", professor_id.into())])
        .await?;
    Ok(Json(rows))
}
