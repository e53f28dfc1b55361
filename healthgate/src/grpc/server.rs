//! gRPC server setup.
//!
//! HealthServiceとUserServiceを1つのtonicサーバーに登録し、
//! 共有のシャットダウンシグナルで停止する。

use crate::grpc::health::HealthServiceImpl;
use crate::grpc::proto::health_service_server::HealthServiceServer;
use crate::grpc::proto::user_service_server::UserServiceServer;
use crate::grpc::users::UserServiceImpl;
use crate::shutdown::ShutdownController;
use crate::AppState;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{error, info};

/// アドレスにバインドしてgRPCサーバーを起動する
///
/// シャットダウンが要求されるまで戻らない。
pub async fn serve(
    state: AppState,
    bind_addr: &str,
    shutdown: ShutdownController,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("Failed to bind gRPC listener to {}: {}", bind_addr, e))?;
    serve_with_listener(state, listener, shutdown).await
}

/// バインド済みのリスナーでgRPCサーバーを起動する
pub async fn serve_with_listener(
    state: AppState,
    listener: TcpListener,
    shutdown: ShutdownController,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let local_addr = listener.local_addr()?;
    info!(address = %local_addr, "gRPC server listening");

    let health_service = HealthServiceImpl::new(state.health.clone());
    let user_service = UserServiceImpl::new(state.users.clone());

    Server::builder()
        .add_service(HealthServiceServer::new(health_service))
        .add_service(UserServiceServer::new(user_service))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            shutdown.wait().await
        })
        .await
        .map_err(|e| {
            error!(error = %e, "gRPC server error");
            e
        })?;

    info!("gRPC server shutdown complete");
    Ok(())
}
