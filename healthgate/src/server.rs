//! HTTP/gRPCサーバー起動・シャットダウンハンドリング
//!
//! 2つのリスナーは同じ`AppState`（接続プール・ヘルス集約器）を共有し、
//! 同じシャットダウンシグナルで停止する。片方が異常終了した場合はもう片方も停止する。

use crate::db;
use crate::health::{DatabaseProbe, HealthAggregator, ProbeRegistrationError, ProbeSet};
use crate::shutdown::{listen_for_signals, ShutdownController};
use crate::AppState;
use healthgate_common::config::ServerConfig;
use healthgate_common::error::GateError;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

/// データベースプローブのキー
pub const DATABASE_PROBE_KEY: &str = "database";

/// サーバー起動・実行時のエラー
#[derive(Debug, Error)]
pub enum ServerError {
    /// ストアの初期化に失敗
    #[error("Store initialization failed: {0}")]
    Store(#[from] GateError),

    /// プローブ登録に失敗
    #[error("Probe registration failed: {0}")]
    Probe(#[from] ProbeRegistrationError),

    /// リスナーのバインドに失敗
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// バインド先
        addr: String,
        /// 原因
        #[source]
        source: std::io::Error,
    },

    /// HTTPサーバーのエラー
    #[error("HTTP server error: {0}")]
    Http(#[source] std::io::Error),

    /// gRPCサーバーのエラー
    #[error("gRPC server error: {0}")]
    Grpc(String),
}

/// 設定からアプリケーション状態を構築する
///
/// 接続プールを作成してマイグレーションを実行し、
/// `database`プローブを登録したヘルス集約器を用意する。
pub async fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let pool = db::initialize_database(&config.database_url, config.max_connections).await?;

    let mut probes = ProbeSet::new();
    probes.register(DATABASE_PROBE_KEY, Arc::new(DatabaseProbe::new(pool.clone())))?;

    let health = HealthAggregator::with_timeout(probes, config.probe_timeout());
    info!(
        probes = health.probe_count(),
        timeout_ms = config.probe_timeout_ms,
        "Health aggregator ready"
    );

    Ok(AppState::new(pool, health))
}

async fn bind(addr: String) -> Result<TcpListener, ServerError> {
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// サーバーを起動し、シャットダウンシグナル（Ctrl+C / SIGTERM）まで待機する
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let state = build_state(&config).await?;

    let http_listener = bind(config.http_bind_addr()).await?;
    let grpc_listener = bind(config.grpc_bind_addr()).await?;

    let shutdown = ShutdownController::default();
    tokio::spawn(listen_for_signals(shutdown.clone()));

    run_with_listeners(state, http_listener, grpc_listener, shutdown).await
}

/// バインド済みのリスナーで両サーバーを実行する
///
/// `shutdown`が要求されると両サーバーが処理中のリクエストを終えてから停止し、
/// 最後に接続プールを閉じる。
pub async fn run_with_listeners(
    state: AppState,
    http_listener: TcpListener,
    grpc_listener: TcpListener,
    shutdown: ShutdownController,
) -> Result<(), ServerError> {
    let http = {
        let state = state.clone();
        let shutdown = shutdown.clone();
        async move {
            let result = serve_http(state, http_listener, shutdown.clone()).await;
            if result.is_err() {
                shutdown.request_shutdown();
            }
            result
        }
    };

    let grpc = {
        let state = state.clone();
        let shutdown = shutdown.clone();
        async move {
            let result = crate::grpc::serve_with_listener(state, grpc_listener, shutdown.clone())
                .await
                .map_err(|e| ServerError::Grpc(e.to_string()));
            if result.is_err() {
                shutdown.request_shutdown();
            }
            result
        }
    };

    let (http_result, grpc_result) = tokio::join!(http, grpc);

    state.db_pool.close().await;
    info!("Database pool closed");

    if let Err(e) = &http_result {
        error!("HTTP server stopped with error: {}", e);
    }
    if let Err(e) = &grpc_result {
        error!("gRPC server stopped with error: {}", e);
    }
    http_result?;
    grpc_result?;

    info!("Server shutdown complete");
    Ok(())
}

/// axumサーバーを起動し、シャットダウンシグナルを待機する
async fn serve_http(
    state: AppState,
    listener: TcpListener,
    shutdown: ShutdownController,
) -> Result<(), ServerError> {
    let local_addr = listener.local_addr().map_err(ServerError::Http)?;
    let app = crate::api::create_app(state);

    info!(address = %local_addr, "HTTP server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
        .map_err(ServerError::Http)?;

    info!("HTTP server shutdown complete");
    Ok(())
}
