// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test helpers: a scripted in-memory database gateway and state builders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::codec::DEFAULT_TOKEN_TTL;
use crate::auth::{Role, TokenCodec};
use crate::db::{DatabaseGateway, GatewayError, Row, SqlValue, WorkUnit};
use crate::state::AppState;

type RoutineHandler = Box<dyn Fn(&[SqlValue]) -> Result<SqlValue, String> + Send + Sync>;

pub type Params = Vec<(String, SqlValue)>;

#[derive(Default)]
struct Journal {
    routines: Vec<(String, Vec<SqlValue>)>,
    queries: Vec<(String, Params)>,
    statements: Vec<(String, Params)>,
    begun: usize,
    commits: usize,
    rollbacks: usize,
}

#[derive(Default)]
struct Inner {
    handlers: Mutex<HashMap<String, RoutineHandler>>,
    rows: Mutex<Vec<Row>>,
    journal: Mutex<Journal>,
    unavailable: Mutex<bool>,
}

/// Gateway whose routine results are scripted per test.
#[derive(Clone, Default)]
pub struct FakeGateway {
    inner: Arc<Inner>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_routine<F>(&self, name: &str, handler: F) -> &Self
    where
        F: Fn(&[SqlValue]) -> Result<SqlValue, String> + Send + Sync + 'static,
    {
        self.inner
            .handlers
            .lock()
            .unwrap()
            .insert(name.to_string(), Box::new(handler));
        self
    }

    pub fn returns(&self, name: &str, value: impl Into<SqlValue>) -> &Self {
        let value = value.into();
        self.on_routine(name, move |_| Ok(value.clone()))
    }

    pub fn fails(&self, name: &str, message: &str) -> &Self {
        let message = message.to_string();
        self.on_routine(name, move |_| Err(message.clone()))
    }

    /// Rows returned by every read query.
    pub fn with_rows(&self, rows: Vec<Row>) -> &Self {
        *self.inner.rows.lock().unwrap() = rows;
        self
    }

    /// Make `begin` and `ping` fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.inner.unavailable.lock().unwrap() = unavailable;
    }

    pub fn routine_calls(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.inner.journal.lock().unwrap().routines.clone()
    }

    pub fn queries(&self) -> Vec<(String, Params)> {
        self.inner.journal.lock().unwrap().queries.clone()
    }

    pub fn statements(&self) -> Vec<(String, Params)> {
        self.inner.journal.lock().unwrap().statements.clone()
    }

    pub fn begun(&self) -> usize {
        self.inner.journal.lock().unwrap().begun
    }

    pub fn commits(&self) -> usize {
        self.inner.journal.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.inner.journal.lock().unwrap().rollbacks
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if *self.inner.unavailable.lock().unwrap() {
            return Err(GatewayError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseGateway for FakeGateway {
    async fn begin(&self) -> Result<Box<dyn WorkUnit>, GatewayError> {
        self.check_available()?;
        self.inner.journal.lock().unwrap().begun += 1;
        Ok(Box::new(FakeWorkUnit {
            inner: self.inner.clone(),
            committed: false,
        }))
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        self.check_available()
    }
}

struct FakeWorkUnit {
    inner: Arc<Inner>,
    committed: bool,
}

fn owned_params(params: &[(&str, SqlValue)]) -> Params {
    params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[async_trait]
impl WorkUnit for FakeWorkUnit {
    async fn call_routine(&mut self, name: &str, args: &[SqlValue]) -> Result<SqlValue, GatewayError> {
        self.inner
            .journal
            .lock()
            .unwrap()
            .routines
            .push((name.to_string(), args.to_vec()));

        let handlers = self.inner.handlers.lock().unwrap();
        let handler = handlers.get(name).ok_or_else(|| GatewayError::EmptyResult {
            routine: name.to_string(),
        })?;
        handler(args).map_err(|msg| GatewayError::Database(sqlx::Error::Protocol(msg)))
    }

    async fn run_query(&mut self, sql: &str, params: &[(&str, SqlValue)]) -> Result<Vec<Row>, GatewayError> {
        self.inner
            .journal
            .lock()
            .unwrap()
            .queries
            .push((sql.to_string(), owned_params(params)));
        Ok(self.inner.rows.lock().unwrap().clone())
    }

    async fn execute(&mut self, sql: &str, params: &[(&str, SqlValue)]) -> Result<u64, GatewayError> {
        self.inner
            .journal
            .lock()
            .unwrap()
            .statements
            .push((sql.to_string(), owned_params(params)));
        Ok(1)
    }

    async fn commit(self: Box<Self>) -> Result<(), GatewayError> {
        let mut unit = self;
        unit.committed = true;
        unit.inner.journal.lock().unwrap().commits += 1;
        Ok(())
    }
}

impl Drop for FakeWorkUnit {
    fn drop(&mut self) {
        if !self.committed {
            if let Ok(mut journal) = self.inner.journal.lock() {
                journal.rollbacks += 1;
            }
        }
    }
}

/// Fixed secret so tests can mint tokens through the state's codec.
pub const TEST_SECRET: &[u8] = b"exam-gateway-test-secret-0000000";

/// App state over a fresh [`FakeGateway`].
pub fn test_state() -> (AppState, FakeGateway) {
    let db = FakeGateway::new();
    let codec = TokenCodec::from_secret(TEST_SECRET, DEFAULT_TOKEN_TTL);
    let state = AppState::with_codec(codec, Arc::new(db.clone()));
    (state, db)
}

/// `Bearer <token>` header value for a freshly issued token.
pub fn bearer(state: &AppState, user_id: i64, role: Role) -> String {
    let token = state.auth.codec().issue(user_id, role).unwrap();
    format!("Bearer {token}")
}

/// One JSON row from `serde_json::json!({...})`.
pub fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
