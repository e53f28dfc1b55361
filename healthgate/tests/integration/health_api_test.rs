//! `GET /api/health`の統合テスト（HTTPとgRPCの判定一致を含む）

use crate::support::{memory_pool, state_with_probes, HangingProbe, StaticProbe, SwitchProbe};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use healthgate::grpc::proto::health_service_server::HealthService;
use healthgate::grpc::proto::HealthCheckRequest;
use healthgate::grpc::HealthServiceImpl;
use healthgate::health::{DatabaseProbe, Probe, ProbeOutcome};
use healthgate::AppState;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn get_health(state: AppState) -> (StatusCode, Value) {
    let app = healthgate::api::create_app(state);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_reports_every_probe() {
    let pool = memory_pool().await;
    let state = state_with_probes(
        pool.clone(),
        vec![
            ("database", Arc::new(DatabaseProbe::new(pool)) as Arc<dyn Probe>),
            (
                "cache",
                Arc::new(StaticProbe(ProbeOutcome::Healthy)) as Arc<dyn Probe>,
            ),
        ],
        Duration::from_secs(1),
    );

    let (status, json) = get_health(state).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["details"]["database"]["status"], "up");
    assert_eq!(json["details"]["cache"]["status"], "up");
    assert_eq!(json["error"], serde_json::json!({}));
}

#[tokio::test]
async fn test_one_failing_probe_returns_503() {
    let pool = memory_pool().await;
    let state = state_with_probes(
        pool.clone(),
        vec![
            ("database", Arc::new(DatabaseProbe::new(pool)) as Arc<dyn Probe>),
            (
                "cache",
                Arc::new(StaticProbe(ProbeOutcome::unhealthy("connection refused")))
                    as Arc<dyn Probe>,
            ),
        ],
        Duration::from_secs(1),
    );

    let (status, json) = get_health(state).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "error");
    assert_eq!(json["info"]["database"]["status"], "up");
    assert_eq!(json["error"]["cache"]["status"], "down");
    assert_eq!(json["error"]["cache"]["message"], "connection refused");
}

#[tokio::test]
async fn test_no_probes_returns_503() {
    let state = state_with_probes(memory_pool().await, Vec::new(), Duration::from_secs(1));

    let (status, json) = get_health(state).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "error");
    assert_eq!(json["details"], serde_json::json!({}));
}

#[tokio::test]
async fn test_hanging_probe_is_bounded_by_timeout() {
    let state = state_with_probes(
        memory_pool().await,
        vec![("stuck", Arc::new(HangingProbe) as Arc<dyn Probe>)],
        Duration::from_millis(100),
    );

    let (status, json) = tokio::time::timeout(Duration::from_secs(5), get_health(state))
        .await
        .expect("health endpoint must answer within the probe timeout");

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["stuck"]["status"], "down");
}

#[tokio::test]
async fn test_http_and_grpc_agree() {
    let switch = Arc::new(SwitchProbe::default());
    let state = state_with_probes(
        memory_pool().await,
        vec![("switch", switch.clone() as Arc<dyn Probe>)],
        Duration::from_secs(1),
    );
    let grpc = HealthServiceImpl::new(state.health.clone());

    for down in [false, true, false] {
        switch.set_down(down);

        let (status, json) = get_health(state.clone()).await;
        let grpc_response = grpc
            .check(tonic::Request::new(HealthCheckRequest {}))
            .await
            .unwrap()
            .into_inner();

        let http_up = status == StatusCode::OK;
        assert_eq!(http_up, grpc_response.status == "up");
        assert_eq!(
            json["details"]["switch"]["status"],
            grpc_response.services["switch"].as_str()
        );
    }
}
