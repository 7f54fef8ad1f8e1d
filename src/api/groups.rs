// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use super::{extract::{ApiJson, ApiPath}, routine_succeeded};
use crate::{
    auth::{Auth, ProfessorOnly},
    db::{
        queries::{
            group_schedule, ADD_STUDENT_TO_GROUP, CREATE_GROUP, DELETE_GROUP, GROUP_STUDENTS,
            STUDENT_ADDED, UPDATE_GROUP,
        },
        Row, WorkUnit,
    },
    error::ApiError,
    models::{AddStudentRequest, AddStudentsRequest, GroupRequest, MessageResponse, UpdateGroupRequest},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/groups",
    tag = "Groups",
    request_body = GroupRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Group created", body = MessageResponse),
        (status = 409, description = "Group already exists"),
    )
)]
pub async fn create_group(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GroupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let group_id = request.id;
    let mut unit = state.db.begin().await?;
    let created = unit
        .call_routine(CREATE_GROUP, &[group_id.into(), request.name.into()])
        .await?;

    if !routine_succeeded(&created) {
        return Err(ApiError::conflict(format!("Group {group_id} already exists")));
    }

    unit.commit().await?;
    info!(group_id, "Group created");
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Group created"))))
}

#[utoipa::path(
    put,
    path = "/v1/groups/{group_id}",
    tag = "Groups",
    params(("group_id" = i64, Path, description = "Group identifier")),
    request_body = UpdateGroupRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Group updated", body = MessageResponse),
        (status = 404, description = "Group not found"),
    )
)]
pub async fn update_group(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateGroupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut unit = state.db.begin().await?;
    let updated = unit
        .call_routine(UPDATE_GROUP, &[group_id.into(), request.name.into()])
        .await?;

    if !routine_succeeded(&updated) {
        return Err(ApiError::not_found(format!("Group {group_id} not found")));
    }

    unit.commit().await?;
    info!(group_id, "Group updated");
    Ok(Json(MessageResponse::new("Group updated")))
}

#[utoipa::path(
    delete,
    path = "/v1/groups/{group_id}",
    tag = "Groups",
    params(("group_id" = i64, Path, description = "Group identifier")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Group deleted", body = MessageResponse),
        (status = 404, description = "Group not found"),
    )
)]
pub async fn delete_group(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut unit = state.db.begin().await?;
    let deleted = unit.call_routine(DELETE_GROUP, &[group_id.into()]).await?;

    if !routine_succeeded(&deleted) {
        return Err(ApiError::not_found(format!("Group {group_id} not found")));
    }

    unit.commit().await?;
    info!(group_id, "Group deleted");
    Ok(Json(MessageResponse::new("Group deleted")))
}

#[utoipa::path(
    get,
    path = "/v1/groups/{group_id}/students",
    tag = "Groups",
    params(("group_id" = i64, Path, description = "Group identifier")),
    security(("bearer" = [])),
    responses((status = 200, description = "Student rows as JSON objects"))
)]
pub async fn group_students(
    Auth(_user): Auth,
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let mut unit = state.db.begin().await?;
    let rows = unit
        .run_query(GROUP_STUDENTS, &[("group_id", group_id.into())])
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/v1/groups/{group_id}/schedule",
    tag = "Groups",
    params(("group_id" = i64, Path, description = "Group identifier")),
    security(("bearer" = [])),
    responses((status = 200, description = "Schedule rows as JSON objects"))
)]
pub async fn group_schedule_rows(
    Auth(_user): Auth,
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let mut unit = state.db.begin().await?;
    let rows = unit
        .run_query(&group_schedule(), &[("group_id", group_id.into())])
        .await?;
    Ok(Json(rows))
}

/// Ask the enrollment routine to add one student.
///
/// Returns the routine's refusal text when it did not add the student.
async fn enroll(unit: &mut dyn WorkUnit, group_id: i64, student_id: i64) -> Result<Option<String>, ApiError> {
    let status = unit
        .call_routine(ADD_STUDENT_TO_GROUP, &[student_id.into(), group_id.into()])
        .await?;

    match status.as_str() {
        Some(STUDENT_ADDED) => Ok(None),
        Some(other) => Ok(Some(other.to_string())),
        None => Ok(Some("Student could not be added".to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/v1/groups/{group_id}/students",
    tag = "Groups",
    params(("group_id" = i64, Path, description = "Group identifier")),
    request_body = AddStudentRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Student added", body = MessageResponse),
        (status = 409, description = "Enrollment refused"),
    )
)]
pub async fn add_student(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(request): ApiJson<AddStudentRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let mut unit = state.db.begin().await?;

    if let Some(refusal) = enroll(unit.as_mut(), group_id, request.student_id).await? {
        warn!(group_id, student_id = request.student_id, %refusal, "Enrollment refused");
        return Err(ApiError::conflict(refusal));
    }

    unit.commit().await?;
    info!(group_id, student_id = request.student_id, "Student added to group");
    Ok((StatusCode::CREATED, Json(MessageResponse::new(STUDENT_ADDED))))
}

/// Add several students to a group.
///
/// All-or-nothing: if any student is refused, nothing is committed and the
/// refusals are returned in `details`.
#[utoipa::path(
    post,
    path = "/v1/groups/{group_id}/students/bulk",
    tag = "Groups",
    params(("group_id" = i64, Path, description = "Group identifier")),
    request_body = AddStudentsRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "All students added", body = MessageResponse),
        (status = 400, description = "Empty student list"),
        (status = 409, description = "At least one enrollment refused; nothing added"),
    )
)]
pub async fn add_students(
    ProfessorOnly(_user): ProfessorOnly,
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(request): ApiJson<AddStudentsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if request.student_ids.is_empty() {
        return Err(ApiError::bad_request("student_ids must not be empty"));
    }

    let mut unit = state.db.begin().await?;
    let mut refusals = Vec::new();

    for &student_id in &request.student_ids {
        if let Some(refusal) = enroll(unit.as_mut(), group_id, student_id).await? {
            refusals.push(json!({ "student_id": student_id, "message": refusal }));
        }
    }

    if !refusals.is_empty() {
        warn!(group_id, refused = refusals.len(), "Bulk enrollment rolled back");
        return Err(
            ApiError::conflict("Some students could not be added; no changes were made")
                .with_details(json!(refusals)),
        );
    }

    unit.commit().await?;
    let added = request.student_ids.len();
    info!(group_id, added, "Students added to group");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!("{added} students added to group"))),
    ))
}
