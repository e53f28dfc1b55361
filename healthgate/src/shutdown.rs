//! Cooperative shutdown controller.
//!
//! HTTPとgRPCの両サーバーが同じコントローラを待機し、
//! OSシグナル受信時にまとめて停止する。

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Shared shutdown signal used for graceful exit of every listener.
#[derive(Clone, Debug)]
pub struct ShutdownController {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownController {
    fn default() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }
}

impl ShutdownController {
    /// Returns true if shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        *self.sender.borrow()
    }

    /// Request shutdown and wake all waiters.
    pub fn request_shutdown(&self) {
        self.sender.send_replace(true);
    }

    /// Wait until shutdown is requested.
    ///
    /// Returns immediately when shutdown was requested before the call.
    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|requested| *requested).await;
    }
}

/// OSシグナル（Ctrl+C / SIGTERM）を待ち、受信したらシャットダウンを要求する
pub async fn listen_for_signals(shutdown: ShutdownController) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = shutdown.wait() => {
            return;
        }
    }

    shutdown.request_shutdown();
}
