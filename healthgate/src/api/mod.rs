//! REST APIハンドラー
//!
//! HTTPアダプタ。現在は`GET /api/health`のみを公開する。

pub mod health;

use crate::AppState;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
