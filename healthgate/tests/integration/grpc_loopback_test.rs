//! 実ソケット経由のgRPCテスト（生成クライアント使用）

use crate::support::{memory_pool, spawn_servers, state_with_probes};
use healthgate::grpc::proto::health_service_client::HealthServiceClient;
use healthgate::grpc::proto;
use healthgate::grpc::proto::user_service_client::UserServiceClient;
use healthgate::health::{DatabaseProbe, Probe};
use std::sync::Arc;
use std::time::Duration;
use tonic::Code;

#[tokio::test]
async fn test_grpc_health_and_user_lifecycle() {
    let pool = memory_pool().await;
    let state = state_with_probes(
        pool.clone(),
        vec![("database", Arc::new(DatabaseProbe::new(pool)) as Arc<dyn Probe>)],
        Duration::from_secs(1),
    );
    let servers = spawn_servers(state).await;

    let mut health = HealthServiceClient::connect(servers.grpc_url())
        .await
        .expect("connect health client");
    let report = health
        .check(proto::HealthCheckRequest {})
        .await
        .unwrap()
        .into_inner();
    assert_eq!(report.status, "up");
    assert_eq!(report.services.get("database").map(String::as_str), Some("up"));

    let mut users = UserServiceClient::connect(servers.grpc_url())
        .await
        .expect("connect user client");

    let created = users
        .create_user(proto::CreateUserRequest {
            full_name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
        })
        .await
        .unwrap()
        .into_inner();

    let found = users
        .get_user(proto::GetUserRequest {
            id: created.id.clone(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(found.user.as_ref(), Some(&created));

    let duplicate = users
        .create_user(proto::CreateUserRequest {
            full_name: "Someone Else".into(),
            email: "grace@example.com".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate.code(), Code::AlreadyExists);

    let count = users
        .count_users(proto::CountUsersRequest {})
        .await
        .unwrap()
        .into_inner();
    assert_eq!(count.count, 1);

    users
        .delete_user(proto::DeleteUserRequest {
            id: created.id.clone(),
        })
        .await
        .unwrap();

    let gone = users
        .get_user(proto::GetUserRequest { id: created.id })
        .await
        .unwrap()
        .into_inner();
    assert!(gone.user.is_none());

    servers.stop().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_grpc_health_down_is_ok_status() {
    let pool = memory_pool().await;
    let probe_pool = pool.clone();
    let state = state_with_probes(
        pool,
        vec![("database", Arc::new(DatabaseProbe::new(probe_pool.clone())) as Arc<dyn Probe>)],
        Duration::from_secs(1),
    );
    let servers = spawn_servers(state).await;

    probe_pool.close().await;

    let mut health = HealthServiceClient::connect(servers.grpc_url())
        .await
        .expect("connect health client");
    let report = health
        .check(proto::HealthCheckRequest {})
        .await
        .expect("down is reported in the payload")
        .into_inner();

    assert_eq!(report.status, "down");
    assert_eq!(report.services.get("database").map(String::as_str), Some("down"));

    servers.stop().await.expect("clean shutdown");
}
