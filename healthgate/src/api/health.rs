//! ヘルスチェックAPI
//!
//! `GET /api/health`
//!
//! 正常時は200、いずれかのプローブが異常なら503を返す。
//! 本文は各プローブの状態を`info`（正常）、`error`（異常）、`details`（全件）に分けて返す。

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use healthgate_common::types::{HealthReport, HealthStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::AppState;

/// プローブ1件分の表現
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndicatorBody {
    /// "up" / "down"
    pub status: HealthStatus,
    /// 付加情報（異常時は`message`）
    #[serde(flatten)]
    pub metadata: BTreeMap<String, String>,
}

/// ヘルスチェックのレスポンス本文
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthCheckBody {
    /// "ok" / "error"
    pub status: String,
    /// 正常なプローブ
    pub info: BTreeMap<String, IndicatorBody>,
    /// 異常なプローブ
    pub error: BTreeMap<String, IndicatorBody>,
    /// 全プローブ
    pub details: BTreeMap<String, IndicatorBody>,
}

impl From<&HealthReport> for HealthCheckBody {
    fn from(report: &HealthReport) -> Self {
        let mut info = BTreeMap::new();
        let mut error = BTreeMap::new();
        let mut details = BTreeMap::new();

        for (key, result) in report.probes() {
            let indicator = IndicatorBody {
                status: result.status(),
                metadata: result.metadata.clone(),
            };
            if result.healthy {
                info.insert(key.clone(), indicator.clone());
            } else {
                error.insert(key.clone(), indicator.clone());
            }
            details.insert(key.clone(), indicator);
        }

        let status = if report.is_up() { "ok" } else { "error" };

        Self {
            status: status.to_string(),
            info,
            error,
            details,
        }
    }
}

/// 異常時のレスポンス（503 + 本文）
#[derive(Debug)]
pub struct HealthUnavailable(pub HealthCheckBody);

impl IntoResponse for HealthUnavailable {
    fn into_response(self) -> Response {
        (StatusCode::SERVICE_UNAVAILABLE, Json(self.0)).into_response()
    }
}

/// GET /api/health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthCheckBody>, HealthUnavailable> {
    let report = state.health.check().await;
    let body = HealthCheckBody::from(&report);

    if report.is_up() {
        Ok(Json(body))
    } else {
        Err(HealthUnavailable(body))
    }
}
