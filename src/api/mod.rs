// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::AuthenticatedUser,
    db::{GatewayError, SqlValue},
    error::ApiError,
    models::{
        AddStudentRequest, AddStudentsRequest, CreateQuestionRequest, ExamCreatedResponse, ExamRequest,
        ExamUpdatedResponse, GroupRequest, LoginRequest, MessageResponse, PersonRequest,
        PresentationRequest, PresentationResponse, QuestionCreatedResponse, QuestionPrivacyRequest,
        TokenResponse, UpdateGroupRequest, UpdatePersonRequest, UpdateQuestionRequest,
    },
    state::AppState,
};

pub mod exams;
pub mod extract;
pub mod groups;
pub mod health;
pub mod people;
pub mod questions;
pub mod schedules;
pub mod session;

/// Boolean outcome of a create/update/delete routine. Anything that is not a
/// truthy scalar counts as a refusal.
pub(crate) fn routine_succeeded(value: &SqlValue) -> bool {
    value.as_bool().unwrap_or(false)
}

/// Integer returned by a routine (new id or affected rows).
pub(crate) fn returned_id(routine: &str, value: &SqlValue) -> Result<i64, ApiError> {
    value.as_i64().ok_or_else(|| {
        ApiError::from(GatewayError::EmptyResult {
            routine: routine.to_string(),
        })
    })
}

/// Reject requests acting on another professor's records.
pub(crate) fn require_self(user: &AuthenticatedUser, professor_id: i64) -> Result<(), ApiError> {
    if user.user_id != professor_id {
        return Err(ApiError::forbidden(
            "Professors can only access their own questions",
        ));
    }
    Ok(())
}

/// CORS policy for the browser front-end. Origins that are not valid header
/// values are skipped.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let v1_routes = Router::new()
        .route("/login", post(session::login))
        .route("/logout", post(session::logout))
        .route("/protected", get(session::welcome))
        .route("/exams", post(exams::create_exam))
        .route(
            "/exams/{exam_id}",
            put(exams::update_exam).delete(exams::delete_exam),
        )
        .route("/exams/{exam_id}/questions", get(exams::exam_questions))
        .route(
            "/exams/{exam_id}/presentations",
            post(exams::submit_presentation),
        )
        .route("/questions", post(questions::create_question))
        .route(
            "/questions/{question_id}",
            put(questions::update_question).delete(questions::delete_question),
        )
        .route(
            "/questions/{question_id}/privacy",
            put(questions::update_question_privacy),
        )
        .route(
            "/question-bank/{professor_id}",
            get(questions::list_question_bank),
        )
        .route(
            "/professors/{professor_id}/private-questions",
            get(questions::list_private_questions),
        )
        .route(
            "/professors/{professor_id}/questions",
            get(questions::list_professor_questions),
        )
        .route("/students", post(people::create_student))
        .route(
            "/students/{student_id}",
            put(people::update_student).delete(people::delete_student),
        )
        .route("/professors", post(people::create_professor))
        .route(
            "/professors/{professor_id}",
            put(people::update_professor).delete(people::delete_professor),
        )
        .route("/groups", post(groups::create_group))
        .route(
            "/groups/{group_id}",
            put(groups::update_group).delete(groups::delete_group),
        )
        .route(
            "/groups/{group_id}/students",
            get(groups::group_students).post(groups::add_student),
        )
        .route("/groups/{group_id}/students/bulk", post(groups::add_students))
        .route("/groups/{group_id}/schedule", get(groups::group_schedule_rows))
        .route("/schedules", get(schedules::list_schedules))
        .route("/semesters", get(schedules::list_semesters));

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        session::login,
        session::logout,
        session::welcome,
        exams::exam_questions,
        exams::create_exam,
        exams::update_exam,
        exams::delete_exam,
        exams::submit_presentation,
        questions::create_question,
        questions::update_question,
        questions::update_question_privacy,
        questions::delete_question,
        questions::list_question_bank,
        questions::list_private_questions,
        questions::list_professor_questions,
        people::create_student,
        people::update_student,
        people::delete_student,
        people::create_professor,
        people::update_professor,
        people::delete_professor,
        groups::create_group,
        groups::update_group,
        groups::delete_group,
        groups::group_students,
        groups::group_schedule_rows,
        groups::add_student,
        groups::add_students,
        schedules::list_schedules,
        schedules::list_semesters
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            MessageResponse,
            LoginRequest,
            TokenResponse,
            ExamRequest,
            ExamCreatedResponse,
            ExamUpdatedResponse,
            PresentationRequest,
            PresentationResponse,
            CreateQuestionRequest,
            UpdateQuestionRequest,
            QuestionPrivacyRequest,
            QuestionCreatedResponse,
            PersonRequest,
            UpdatePersonRequest,
            GroupRequest,
            UpdateGroupRequest,
            AddStudentRequest,
            AddStudentsRequest
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Session", description = "Login, logout and session checks"),
        (name = "Exams", description = "Exam definitions and submissions"),
        (name = "Questions", description = "Question authoring and question bank"),
        (name = "Students", description = "Student accounts"),
        (name = "Professors", description = "Professor accounts"),
        (name = "Groups", description = "Groups and enrollment"),
        (name = "Schedules", description = "Schedules and semesters")
    )
)]
struct ApiDoc;
