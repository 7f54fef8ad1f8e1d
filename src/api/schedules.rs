// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::extract::ApiQuery;

use crate::{
    auth::Auth,
    db::{
        queries::{schedules_by_week, SEMESTERS},
        Row,
    },
    error::ApiError,
    models::ScheduleQuery,
    state::AppState,
};

/// Schedules of one semester week, flagged with group and exam assignment.
#[utoipa::path(
    get,
    path = "/v1/schedules",
    tag = "Schedules",
    params(ScheduleQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Schedule rows as JSON objects"),
        (status = 400, description = "Missing or malformed week/semester"),
    )
)]
pub async fn list_schedules(
    Auth(_user): Auth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ScheduleQuery>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let mut unit = state.db.begin().await?;
    let rows = unit
        .run_query(
            &schedules_by_week(),
            &[("week", query.week.into()), ("semester", query.semester.into())],
        )
        .await?;
    Ok(Json(rows))
}

/// Semesters with their number of scheduled weeks.
#[utoipa::path(
    get,
    path = "/v1/semesters",
    tag = "Schedules",
    security(("bearer" = [])),
    responses((status = 200, description = "Semester rows as JSON objects"))
)]
pub async fn list_semesters(Auth(_user): Auth, State(state): State<AppState>) -> Result<Json<Vec<Row>>, ApiError> {
    let mut unit = state.db.begin().await?;
    let rows = unit.run_query(SEMESTERS, &[]).await?;
    Ok(Json(rows))
}
