//! healthgate server
//!
//! ユーザーディレクトリとヘルスチェックをHTTP/gRPCの両方で提供するサーバー

#![warn(missing_docs)]

/// REST APIハンドラー
pub mod api;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー・CLI上書き）
pub mod config;

/// データベースアクセス
pub mod db;

/// gRPCサービス
pub mod grpc;

/// ヘルスチェック（プローブと集約器）
pub mod health;

/// ロギング初期化ユーティリティ
pub mod logging;

/// HTTP/gRPCサーバー起動・シャットダウンハンドリング
pub mod server;

/// Cooperative shutdown controller
pub mod shutdown;

use std::sync::Arc;

/// アプリケーション状態
///
/// HTTPとgRPCの両アダプタが同じインスタンスを共有する。
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// ヘルス集約器
    pub health: health::HealthAggregator,
    /// ユーザーリポジトリ
    pub users: Arc<dyn db::traits::UserRepository>,
}

impl AppState {
    /// 接続プールとヘルス集約器から状態を構築（リポジトリはプールを使用）
    pub fn new(db_pool: sqlx::SqlitePool, health: health::HealthAggregator) -> Self {
        let users: Arc<dyn db::traits::UserRepository> = Arc::new(db_pool.clone());
        Self {
            db_pool,
            health,
            users,
        }
    }
}
