// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exam Gateway - Exam Management API
//!
//! HTTP front for an exam-management database whose business rules live in
//! stored functions. The service authenticates every request with a signed,
//! expiring session token and relays the call to the matching routine.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session tokens, revocation and role extractors
//! - `db` - Database gateway over pooled Postgres transactions
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;

#[cfg(test)]
pub mod testutil;
