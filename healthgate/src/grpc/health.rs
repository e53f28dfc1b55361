//! HealthService gRPC implementation.
//!
//! HTTPの`GET /api/health`と同じ集約器を使う。
//! 異常はペイロードの`status = "down"`で表し、gRPCエラーにはしない。

use crate::grpc::proto::health_service_server::HealthService as HealthServiceTrait;
use crate::grpc::proto;
use crate::health::HealthAggregator;
use tonic::{Request, Response, Status};
use tracing::debug;

/// gRPC Health service implementation.
#[derive(Debug, Clone)]
pub struct HealthServiceImpl {
    health: HealthAggregator,
}

impl HealthServiceImpl {
    /// Create a new health service.
    pub fn new(health: HealthAggregator) -> Self {
        Self { health }
    }
}

#[tonic::async_trait]
impl HealthServiceTrait for HealthServiceImpl {
    async fn check(
        &self,
        _request: Request<proto::HealthCheckRequest>,
    ) -> Result<Response<proto::HealthCheckResponse>, Status> {
        debug!("gRPC health check");

        let report = self.health.check().await;
        Ok(Response::new(proto::HealthCheckResponse::from(&report)))
    }
}
