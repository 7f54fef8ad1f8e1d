// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Database Gateway
//!
//! Exam rules live in stored functions inside the database. This module is
//! the narrow seam handlers use to reach them:
//!
//! - [`DatabaseGateway::begin`] checks a connection out of the pool and opens
//!   a transaction, returning a [`WorkUnit`]
//! - [`WorkUnit::call_routine`] invokes a stored function by name with
//!   positional arguments
//! - [`WorkUnit::run_query`] runs a parameterized read with `:name` placeholders
//! - [`WorkUnit::commit`] makes mutations durable
//!
//! Dropping a work unit without committing rolls it back and returns the
//! connection to the pool. Handlers rely on this on every error path.

pub mod postgres;
pub mod queries;

use async_trait::async_trait;
use serde_json::Value;

pub use postgres::PgGateway;

/// One result row, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Errors from the database layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid routine name: {0}")]
    InvalidRoutineName(String),

    #[error("missing query parameter: {0}")]
    MissingParameter(String),

    #[error("routine {routine} returned no result")]
    EmptyResult { routine: String },

    #[error("cannot decode column {column} of type {type_name}")]
    UndecodableColumn { column: String, type_name: String },
}

/// Scalar argument or result of a stored routine.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    /// Integer view; booleans map to 0/1.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            SqlValue::Bool(b) => Some(i64::from(*b)),
            SqlValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            SqlValue::Float(_) => None,
            SqlValue::Text(s) => s.trim().parse().ok(),
            SqlValue::Null => None,
        }
    }

    /// Boolean view; integers are true when non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Int(v) => Some(*v != 0),
            SqlValue::Float(f) => Some(*f != 0.0),
            SqlValue::Text(_) | SqlValue::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => n.as_f64().map(SqlValue::Float).unwrap_or(SqlValue::Null),
            },
            Value::String(s) => SqlValue::Text(s),
            other => SqlValue::Text(other.to_string()),
        }
    }
}

impl From<SqlValue> for Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Bool(b),
            SqlValue::Int(i) => Value::Number(i.into()),
            SqlValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SqlValue::Text(s) => Value::String(s),
        }
    }
}

/// Source of per-request work units.
#[async_trait]
pub trait DatabaseGateway: Send + Sync {
    /// Check out a connection and open a transaction.
    async fn begin(&self) -> Result<Box<dyn WorkUnit>, GatewayError>;

    /// Round-trip to the database (readiness probe).
    async fn ping(&self) -> Result<(), GatewayError>;
}

/// A single request's database interaction.
#[async_trait]
pub trait WorkUnit: Send {
    /// Invoke the stored function `name` with positional `args`.
    async fn call_routine(&mut self, name: &str, args: &[SqlValue]) -> Result<SqlValue, GatewayError>;

    /// Run a read query with `:name` placeholders.
    async fn run_query(&mut self, sql: &str, params: &[(&str, SqlValue)]) -> Result<Vec<Row>, GatewayError>;

    /// Run a statement with `:name` placeholders, returning rows affected.
    async fn execute(&mut self, sql: &str, params: &[(&str, SqlValue)]) -> Result<u64, GatewayError>;

    /// Commit everything done in this unit.
    async fn commit(self: Box<Self>) -> Result<(), GatewayError>;
}

/// Rewrite `:name` placeholders to positional `$n` and collect values.
///
/// Each occurrence gets its own position, so a name may repeat. `::` casts
/// are left untouched.
pub fn bind_named(sql: &str, params: &[(&str, SqlValue)]) -> Result<(String, Vec<SqlValue>), GatewayError> {
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ':' {
            if let Some(':') = chars.peek().copied() {
                out.push_str("::");
                chars.next();
                continue;
            }
            if let Some(next) = chars.peek().copied() {
                if next.is_ascii_alphabetic() || next == '_' {
                    let mut name = String::new();
                    while let Some(c) = chars.peek().copied() {
                        if c.is_ascii_alphanumeric() || c == '_' {
                            name.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let value = params
                        .iter()
                        .find(|(key, _)| *key == name)
                        .map(|(_, v)| v.clone())
                        .ok_or_else(|| GatewayError::MissingParameter(name.clone()))?;
                    values.push(value);
                    out.push('$');
                    out.push_str(&values.len().to_string());
                    continue;
                }
            }
        }
        out.push(ch);
    }

    Ok((out, values))
}

/// Accept only plain (optionally schema-qualified) identifiers as routine names.
pub fn validate_routine_name(name: &str) -> Result<&str, GatewayError> {
    let valid = !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if valid {
        Ok(name)
    } else {
        Err(GatewayError::InvalidRoutineName(name.to_string()))
    }
}
