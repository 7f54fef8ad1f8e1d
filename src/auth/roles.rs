// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Professor` - Manages exams, questions, groups and user accounts
/// - `Student` - Reads schedules and submits exam presentations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Privileged account (professor login)
    Professor,
    /// Regular account (student login)
    Student,
}

impl Role {
    /// Parse the login role flag: `1` is a professor, `0` a student.
    pub fn from_flag(flag: i64) -> Option<Role> {
        match flag {
            1 => Some(Role::Professor),
            0 => Some(Role::Student),
            _ => None,
        }
    }

    /// Build a role from the `is_professor` token claim.
    pub fn from_privileged(is_professor: bool) -> Role {
        if is_professor {
            Role::Professor
        } else {
            Role::Student
        }
    }

    /// Whether this role carries the privileged (professor) flag.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Professor)
    }
}

impl Default for Role {
    /// Default role is Student (least privilege).
    fn default() -> Self {
        Role::Student
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Professor => write!(f, "professor"),
            Role::Student => write!(f, "student"),
        }
    }
}
