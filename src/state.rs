// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthGate, InMemoryRevocationStore, RevocationStore, TokenCodec};
use crate::db::DatabaseGateway;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthGate,
    pub db: Arc<dyn DatabaseGateway>,
}

impl AppState {
    pub fn new(auth: AuthGate, db: Arc<dyn DatabaseGateway>) -> Self {
        Self { auth, db }
    }

    /// State with an empty in-memory revocation set.
    pub fn with_codec(codec: TokenCodec, db: Arc<dyn DatabaseGateway>) -> Self {
        let revocations: Arc<dyn RevocationStore> = Arc::new(InMemoryRevocationStore::new());
        Self::new(AuthGate::new(Arc::new(codec), revocations), db)
    }
}
