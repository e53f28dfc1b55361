//! healthgate Server Entry Point

use clap::Parser;
use healthgate::cli::Cli;
use healthgate::{config, logging, server};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let args = cli.serve_args();
    let config = match config::load(args.config.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        http = %config.http_bind_addr(),
        grpc = %config.grpc_bind_addr(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting healthgate"
    );

    if let Err(e) = server::run(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
