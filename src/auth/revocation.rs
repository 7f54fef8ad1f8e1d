// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Revoked session tokens.
//!
//! Logging out adds the raw token string to a [`RevocationStore`]. The store
//! is owned by `AppState` and injected into the auth gate, so tests get a
//! fresh one per state and a shared backend can replace it later.
//!
//! ## Retention
//!
//! Only tokens that verify are recorded, and each entry is kept until the
//! token's own expiration. Past that point the codec rejects the token on
//! its own, so [`RevocationStore::prune`] can drop the entry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Storage for explicitly invalidated tokens.
pub trait RevocationStore: Send + Sync {
    /// Mark a token as revoked until `expires_at`. Revoking twice has no
    /// further effect.
    fn revoke(&self, token: &str, expires_at: DateTime<Utc>);

    /// Whether the token has been revoked.
    fn is_revoked(&self, token: &str) -> bool;

    /// Drop entries whose deadline is before `now`.
    /// Returns the number of entries removed.
    fn prune(&self, now: DateTime<Utc>) -> usize;

    /// Number of tracked tokens.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local revocation set.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn revoke(&self, token: &str, expires_at: DateTime<Utc>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(token.to_string()).or_insert(expires_at);
        }
    }

    fn is_revoked(&self, token: &str) -> bool {
        // A poisoned lock means a writer panicked mid-update; refuse the token.
        match self.entries.read() {
            Ok(entries) => entries.contains_key(token),
            Err(_) => true,
        }
    }

    fn prune(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, deadline| *deadline >= now);
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

/// Default interval between prune sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Background task pruning a revocation store.
pub struct RevocationSweeper {
    store: Arc<dyn RevocationStore>,
    interval: Duration,
}

impl RevocationSweeper {
    pub fn new(store: Arc<dyn RevocationStore>) -> Self {
        Self {
            store,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Revocation sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Revocation sweeper shutting down");
                    return;
                }
            }

            let removed = self.store.prune(Utc::now());
            if removed > 0 {
                debug!(
                    removed,
                    remaining = self.store.len(),
                    "Pruned revoked tokens past retention"
                );
            }
        }
    }
}
