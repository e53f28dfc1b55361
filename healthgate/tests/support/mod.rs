//! 統合テスト用ユーティリティ

#![allow(dead_code)]

use async_trait::async_trait;
use healthgate::health::{HealthAggregator, Probe, ProbeOutcome, ProbeSet};
use healthgate::shutdown::ShutdownController;
use healthgate::AppState;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// マイグレーション済みのインメモリプール
pub async fn memory_pool() -> SqlitePool {
    healthgate::db::initialize_database("sqlite::memory:", 1)
        .await
        .expect("Failed to create in-memory database")
}

/// 常に同じ結果を返すプローブ
pub struct StaticProbe(pub ProbeOutcome);

#[async_trait]
impl Probe for StaticProbe {
    async fn ping(&self) -> ProbeOutcome {
        self.0.clone()
    }
}

/// テスト中に状態を切り替えられるプローブ
#[derive(Default)]
pub struct SwitchProbe {
    down: AtomicBool,
}

impl SwitchProbe {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl Probe for SwitchProbe {
    async fn ping(&self) -> ProbeOutcome {
        if self.down.load(Ordering::SeqCst) {
            ProbeOutcome::unhealthy("switched off")
        } else {
            ProbeOutcome::Healthy
        }
    }
}

/// 応答しないプローブ
pub struct HangingProbe;

#[async_trait]
impl Probe for HangingProbe {
    async fn ping(&self) -> ProbeOutcome {
        std::future::pending::<()>().await;
        ProbeOutcome::Healthy
    }
}

/// 指定プローブで状態を構築
pub fn state_with_probes(
    pool: SqlitePool,
    probes: Vec<(&str, Arc<dyn Probe>)>,
    timeout: Duration,
) -> AppState {
    let mut set = ProbeSet::new();
    for (key, probe) in probes {
        set.register(key, probe).expect("probe registration failed");
    }
    AppState::new(pool, HealthAggregator::with_timeout(set, timeout))
}

/// ループバックで起動したHTTP/gRPCサーバー
pub struct RunningServers {
    pub http_addr: SocketAddr,
    pub grpc_addr: SocketAddr,
    shutdown: ShutdownController,
    handle: JoinHandle<Result<(), healthgate::server::ServerError>>,
}

impl RunningServers {
    /// gRPCのエンドポイントURL
    pub fn grpc_url(&self) -> String {
        format!("http://{}", self.grpc_addr)
    }

    /// シャットダウンを要求し、終了を待つ
    pub async fn stop(self) -> Result<(), healthgate::server::ServerError> {
        self.shutdown.request_shutdown();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("servers did not stop in time")
            .expect("server task panicked")
    }
}

/// 127.0.0.1の空きポートで両サーバーを起動
pub async fn spawn_servers(state: AppState) -> RunningServers {
    let http = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let grpc = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let http_addr = http.local_addr().unwrap();
    let grpc_addr = grpc.local_addr().unwrap();
    let shutdown = ShutdownController::default();

    let handle = tokio::spawn(healthgate::server::run_with_listeners(
        state,
        http,
        grpc,
        shutdown.clone(),
    ));

    RunningServers {
        http_addr,
        grpc_addr,
        shutdown,
        handle,
    }
}
