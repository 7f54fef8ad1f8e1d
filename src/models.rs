// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Session**: login credentials and issued tokens
//! - **Exams**: exam definitions and student presentations
//! - **Questions**: question bank entries and privacy
//! - **People**: student, professor and group records

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Common Responses
// =============================================================================

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Session Models
// =============================================================================

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Student or professor identifier.
    pub id: i64,
    pub password: String,
    /// `1` to log in as a professor, `0` as a student.
    pub is_professor: i64,
}

/// Issued session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
}

// =============================================================================
// Exam Models
// =============================================================================

/// Exam definition used for create and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExamRequest {
    pub name: String,
    pub description: String,
    pub question_count: i64,
    /// Time limit in minutes.
    pub time_limit: i64,
    pub course_id: i64,
    pub professor_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ExamCreatedResponse {
    pub exam_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ExamUpdatedResponse {
    pub rows_affected: i64,
}

/// A student's submitted exam.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PresentationRequest {
    pub student_id: i64,
    /// Submission timestamp as stored by the database routine.
    pub presented_at: String,
    pub time_taken: String,
    /// Serialized answers.
    pub answers: String,
    #[serde(default)]
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PresentationResponse {
    pub message: String,
    pub presentation_id: i64,
}

// =============================================================================
// Question Models
// =============================================================================

/// Question attached to an exam on creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateQuestionRequest {
    pub text: String,
    pub options: String,
    pub correct_answers: String,
    pub type_id: i64,
    #[serde(default)]
    pub topic: Option<String>,
    /// `0` public, `1` private.
    #[serde(default)]
    pub privacy: i64,
    pub exam_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateQuestionRequest {
    pub text: String,
    pub options: String,
    pub correct_answers: String,
    pub type_id: i64,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub privacy: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionPrivacyRequest {
    pub professor_id: i64,
    pub privacy: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct QuestionCreatedResponse {
    pub message: String,
    pub question_id: i64,
}

/// Optional topic filter for question bank listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopicQuery {
    pub topic: Option<String>,
}

// =============================================================================
// People Models
// =============================================================================

/// Student or professor account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PersonRequest {
    pub id: i64,
    pub name: String,
    pub password: String,
}

/// Student or professor account update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePersonRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupRequest {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateGroupRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddStudentRequest {
    pub student_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddStudentsRequest {
    pub student_ids: Vec<i64>,
}

// =============================================================================
// Schedule Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleQuery {
    pub week: i64,
    pub semester: String,
}
