//! 주식 랭커 데이터 수집기 CLI.

use clap::{Parser, Subcommand};
use ranker_collector::{
    start_refresh_scheduler, start_universe_scheduler, CollectorError, RefreshJob, UniverseJob,
};
use ranker_core::{init_logging, AppConfig, LogConfig};
use ranker_data::{
    connect_with_retry, ensure_schema, NseListingProvider, PgSnapshotStore, PgUniverseStore,
    YahooFundamentalsProvider,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "ranker-collector")]
#[command(about = "Magic Formula stock ranker data collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일
    #[arg(long, default_value = ranker_core::DEFAULT_CONFIG_PATH)]
    config: String,

    /// 로그 레벨 재정의 (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 거래소 상장 목록으로 심볼 유니버스 시딩
    SyncSymbols,

    /// 재무 데이터 갱신 1회 실행
    RefreshFundamentals {
        /// 지정한 심볼만 처리 (쉼표 구분, 예: "TCS.NS,INFY.NS")
        #[arg(long)]
        symbols: Option<String>,
    },

    /// 유니버스 갱신 후 재무 데이터 갱신
    RunAll,

    /// Ctrl+C까지 두 작업을 주기적으로 실행
    Daemon,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config =
        AppConfig::load(&cli.config).map_err(|e| CollectorError::Config(e.to_string()))?;

    let mut log_config = LogConfig::from(&config.logging);
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(log_config)?;

    tracing::info!("Stock ranker collector starting");

    let pool = connect_with_retry(&config.database)
        .await
        .map_err(CollectorError::from)?;
    ensure_schema(&pool).await.map_err(CollectorError::from)?;

    let snapshots = Arc::new(PgSnapshotStore::new(pool.clone()));
    let universe = Arc::new(PgUniverseStore::new(pool.clone()));

    let refresh_job = Arc::new(RefreshJob::new(
        Arc::new(YahooFundamentalsProvider::new().map_err(CollectorError::from)?),
        snapshots,
        universe.clone(),
        config.refresh.clone(),
    ));
    let universe_job = Arc::new(UniverseJob::new(
        Arc::new(
            NseListingProvider::new(
                config.universe.listing_url.clone(),
                config.universe.symbol_suffix.clone(),
            )
            .map_err(CollectorError::from)?,
        ),
        universe,
    ));

    let shutdown_token = CancellationToken::new();

    match cli.command {
        Commands::SyncSymbols => {
            universe_job.run().await.log_summary();
        }
        Commands::RefreshFundamentals { symbols } => {
            let stats = match symbols {
                Some(list) => {
                    let symbols: Vec<String> = list
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect();
                    refresh_job.run_for_symbols(&symbols, &shutdown_token).await
                }
                None => refresh_job.run(&shutdown_token).await,
            };
            stats.log_summary();
        }
        Commands::RunAll => {
            tracing::info!("Step 1/2: universe refresh");
            universe_job.run().await.log_summary();

            tracing::info!("Step 2/2: fundamentals refresh");
            refresh_job.run(&shutdown_token).await.log_summary();
        }
        Commands::Daemon => {
            let universe_handle = start_universe_scheduler(
                universe_job,
                config.universe.initial_delay(),
                config.universe.interval(),
                shutdown_token.clone(),
            );
            let refresh_handle = start_refresh_scheduler(
                refresh_job,
                config.refresh.initial_delay(),
                config.refresh.interval(),
                shutdown_token.clone(),
            );

            tokio::signal::ctrl_c().await?;
            tracing::info!("Shutdown signal received, stopping schedulers");
            shutdown_token.cancel();

            let _ = tokio::join!(universe_handle, refresh_handle);
        }
    }

    pool.close().await;
    tracing::info!("Stock ranker collector stopped");

    Ok(())
}
