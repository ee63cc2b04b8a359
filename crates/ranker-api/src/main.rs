//! 주식 랭커 API 서버.
//!
//! `/getStockRanks`를 제공하고, 종료될 때까지 유니버스/재무 데이터 갱신
//! 작업을 백그라운드에서 실행합니다.

use std::sync::Arc;

use axum::http::StatusCode;
use ranker_api::tasks::start_background_jobs;
use ranker_api::{api_router, AppState};
use ranker_core::{init_logging, AppConfig, LogConfig, RankerError};
use ranker_data::{connect_with_retry, ensure_schema, PgSnapshotStore};
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config_path = std::env::var("RANKER_CONFIG")
        .unwrap_or_else(|_| ranker_core::DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path).map_err(RankerError::from)?;

    init_logging(LogConfig::from(&config.logging))?;

    info!(config = %config_path, "Stock ranker API starting");

    if !config.auth.is_configured() {
        return Err(RankerError::Config("auth.api_key must be set".to_string()).into());
    }

    let pool = connect_with_retry(&config.database)
        .await
        .map_err(RankerError::from)?;
    ensure_schema(&pool).await.map_err(RankerError::from)?;

    let shutdown_token = CancellationToken::new();
    let job_handles = start_background_jobs(pool.clone(), &config, shutdown_token.clone())
        .map_err(RankerError::from)?;

    let bind_addr = config.server.bind_addr();
    let request_timeout = config.server.request_timeout();

    let state = AppState::new(Arc::new(PgSnapshotStore::new(pool.clone())), config.auth)
        .with_db_pool(pool.clone());

    let app = api_router(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    // 서버가 스스로 종료된 경우에도 작업을 함께 종료
    shutdown_token.cancel();
    for handle in job_handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Background job ended abnormally");
        }
    }

    pool.close().await;
    info!("Stock ranker API stopped");

    Ok(())
}

/// Ctrl+C 또는 SIGTERM을 받으면 백그라운드 작업을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, shutting down"),
        _ = terminate => warn!("Received SIGTERM, shutting down"),
    }

    shutdown_token.cancel();
}
