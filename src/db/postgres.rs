// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Postgres implementation of the database gateway.
//!
//! Stored functions are invoked as `SELECT name($1, ..., $n) AS result`
//! inside the work unit's transaction.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::types::Decimal;
use sqlx::{Column, Postgres, Row as _, Transaction, TypeInfo};

use super::{bind_named, validate_routine_name, DatabaseGateway, GatewayError, Row, SqlValue, WorkUnit};

/// Pooled Postgres gateway.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    /// Connect a pool of at most `max_connections`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "Database pool connected");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DatabaseGateway for PgGateway {
    async fn begin(&self) -> Result<Box<dyn WorkUnit>, GatewayError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgWorkUnit { tx }))
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Transaction on a pooled connection. Rolled back on drop unless committed.
pub struct PgWorkUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl WorkUnit for PgWorkUnit {
    async fn call_routine(&mut self, name: &str, args: &[SqlValue]) -> Result<SqlValue, GatewayError> {
        let sql = routine_call_sql(validate_routine_name(name)?, args.len());
        tracing::debug!(routine = name, args = args.len(), "Calling stored routine");

        let row = bind_values(sqlx::query(&sql), args.to_vec())
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| GatewayError::EmptyResult {
                routine: name.to_string(),
            })?;

        Ok(SqlValue::from(decode_column(&row, 0)?))
    }

    async fn run_query(&mut self, sql: &str, params: &[(&str, SqlValue)]) -> Result<Vec<Row>, GatewayError> {
        let (sql, values) = bind_named(sql, params)?;
        let rows = bind_values(sqlx::query(&sql), values)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(row_to_json).collect()
    }

    async fn execute(&mut self, sql: &str, params: &[(&str, SqlValue)]) -> Result<u64, GatewayError> {
        let (sql, values) = bind_named(sql, params)?;
        let result = bind_values(sqlx::query(&sql), values)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), GatewayError> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// `SELECT name($1, ..., $n) AS result`
fn routine_call_sql(name: &str, arity: usize) -> String {
    let placeholders = (1..=arity)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {name}({placeholders}) AS result")
}

fn bind_values<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    values: Vec<SqlValue>,
) -> Query<'q, Postgres, PgArguments> {
    for value in values {
        query = match value {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(b) => query.bind(b),
            // int4 widens implicitly to int8/numeric during function
            // resolution; int8 does not narrow.
            SqlValue::Int(i) => match i32::try_from(i) {
                Ok(small) => query.bind(small),
                Err(_) => query.bind(i),
            },
            SqlValue::Float(f) => query.bind(f),
            SqlValue::Text(s) => query.bind(s),
        };
    }
    query
}

fn row_to_json(row: &PgRow) -> Result<Row, GatewayError> {
    let mut obj = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        obj.insert(column.name().to_string(), decode_column(row, index)?);
    }
    Ok(obj)
}

/// How a Postgres column is read back into JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Bool,
    Json,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Text,
}

fn column_kind(type_name: &str) -> ColumnKind {
    match type_name.to_ascii_uppercase().as_str() {
        "INT2" => ColumnKind::Int2,
        "INT4" => ColumnKind::Int4,
        "INT8" => ColumnKind::Int8,
        "FLOAT4" => ColumnKind::Float4,
        "FLOAT8" => ColumnKind::Float8,
        "NUMERIC" => ColumnKind::Numeric,
        "BOOL" => ColumnKind::Bool,
        "JSON" | "JSONB" => ColumnKind::Json,
        "UUID" => ColumnKind::Uuid,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        "TIMESTAMP" => ColumnKind::Timestamp,
        "TIMESTAMPTZ" => ColumnKind::TimestampTz,
        _ => ColumnKind::Text,
    }
}

/// Integral numerics become JSON integers; others become floats, or strings
/// when they do not fit an `f64`.
fn numeric_to_json(value: Decimal) -> Value {
    if value.fract().is_zero() {
        if let Some(int) = value.to_i64() {
            return Value::Number(int.into());
        }
    }
    value
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

fn decode_column(row: &PgRow, index: usize) -> Result<Value, GatewayError> {
    let column = row.columns().get(index).ok_or_else(|| GatewayError::UndecodableColumn {
        column: index.to_string(),
        type_name: "missing".to_string(),
    })?;
    let type_name = column.type_info().name();
    let undecodable = |e: sqlx::Error| {
        tracing::warn!(column = column.name(), type_name, error = %e, "Column decode failed");
        GatewayError::UndecodableColumn {
            column: column.name().to_string(),
            type_name: type_name.to_string(),
        }
    };

    let value = match column_kind(type_name) {
        ColumnKind::Int2 => row
            .try_get::<Option<i16>, _>(index)
            .map_err(undecodable)?
            .map(|v| Value::Number(v.into())),
        ColumnKind::Int4 => row
            .try_get::<Option<i32>, _>(index)
            .map_err(undecodable)?
            .map(|v| Value::Number(v.into())),
        ColumnKind::Int8 => row
            .try_get::<Option<i64>, _>(index)
            .map_err(undecodable)?
            .map(|v| Value::Number(v.into())),
        ColumnKind::Float4 => row
            .try_get::<Option<f32>, _>(index)
            .map_err(undecodable)?
            .and_then(|v| serde_json::Number::from_f64(f64::from(v)))
            .map(Value::Number),
        ColumnKind::Float8 => row
            .try_get::<Option<f64>, _>(index)
            .map_err(undecodable)?
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        ColumnKind::Numeric => row
            .try_get::<Option<Decimal>, _>(index)
            .map_err(undecodable)?
            .map(numeric_to_json),
        ColumnKind::Bool => row
            .try_get::<Option<bool>, _>(index)
            .map_err(undecodable)?
            .map(Value::Bool),
        ColumnKind::Json => row.try_get::<Option<Value>, _>(index).map_err(undecodable)?,
        ColumnKind::Uuid => row
            .try_get::<Option<uuid::Uuid>, _>(index)
            .map_err(undecodable)?
            .map(|v| Value::String(v.to_string())),
        ColumnKind::Date => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)
            .map_err(undecodable)?
            .map(|v| Value::String(v.to_string())),
        ColumnKind::Time => row
            .try_get::<Option<chrono::NaiveTime>, _>(index)
            .map_err(undecodable)?
            .map(|v| Value::String(v.to_string())),
        ColumnKind::Timestamp => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(index)
            .map_err(undecodable)?
            .map(|v| Value::String(v.to_string())),
        ColumnKind::TimestampTz => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index)
            .map_err(undecodable)?
            .map(|v| Value::String(v.to_rfc3339())),
        ColumnKind::Text => row
            .try_get::<Option<String>, _>(index)
            .map_err(undecodable)?
            .map(Value::String),
    };

    Ok(value.unwrap_or(Value::Null))
}
