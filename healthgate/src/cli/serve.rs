//! serve サブコマンド
//!
//! HTTPとgRPCのサーバーを起動します。

use crate::config::ConfigOverrides;
use clap::Args;
use std::path::PathBuf;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeArgs {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = "HEALTHGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind address
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// HTTP listen port
    #[arg(long)]
    pub http_port: Option<u16>,

    /// gRPC listen port
    #[arg(long)]
    pub grpc_port: Option<u16>,
}

impl ServeArgs {
    /// 設定への上書き値
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            http_port: self.http_port,
            grpc_port: self.grpc_port,
        }
    }
}
