// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use exam_gateway_server::{
    api::router,
    auth::{RevocationSweeper, TokenCodec},
    config::ServerConfig,
    db::PgGateway,
    logging,
    state::AppState,
};

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(%message, "Server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env().map_err(|e| format!("configuration: {e}"))?;

    // Fresh secret per process; a restart ends every session.
    let codec = TokenCodec::generate(config.token_ttl_chrono())
        .map_err(|e| format!("token secret: {e}"))?;

    let gateway = PgGateway::connect(
        &config.database_url,
        config.db_max_connections,
        config.db_acquire_timeout,
    )
    .await
    .map_err(|e| format!("database: {e}"))?;

    let state = AppState::with_codec(codec, Arc::new(gateway));
    let shutdown = CancellationToken::new();

    let sweeper = RevocationSweeper::new(state.auth.revocations().clone())
        .with_interval(config.revocation_sweep_interval);
    let sweeper_task = tokio::spawn(sweeper.run(shutdown.clone()));

    let app = router(state, &config.allowed_origins);
    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(watch_shutdown(handle.clone(), shutdown.clone()));

    let served = match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "failed to install rustls crypto provider".to_string())?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .map_err(|e| format!("TLS credentials: {e}"))?;

            info!(addr = %config.bind_addr, "Exam gateway listening on https (docs at /docs)");
            axum_server::bind_rustls(config.bind_addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!(addr = %config.bind_addr, "Exam gateway listening on http (docs at /docs)");
            axum_server::bind(config.bind_addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    shutdown.cancel();
    let _ = sweeper_task.await;
    served.map_err(|e| format!("server: {e}"))?;

    info!("Exam gateway stopped");
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM, then drain connections and stop background tasks.
async fn watch_shutdown(handle: Handle<SocketAddr>, shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancellation_stops_the_shutdown_watcher() {
        let handle: Handle<SocketAddr> = Handle::new();
        let shutdown = CancellationToken::new();
        let watcher = tokio::spawn(watch_shutdown(handle.clone(), shutdown.clone()));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), watcher)
            .await
            .expect("watcher should return after cancellation")
            .unwrap();
        assert_eq!(handle.connection_count(), 0);
    }
}
