//! 設定管理
//!
//! ServerConfig: デフォルト値 ← 設定ファイル（任意） ← 環境変数（`HEALTHGATE_`接頭辞）

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{CommonError, CommonResult};

/// 環境変数の接頭辞
pub const ENV_PREFIX: &str = "HEALTHGATE";

/// サーバー設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTPポート番号 (デフォルト: 3000)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// gRPCポート番号 (デフォルト: 5000)
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,

    /// データベースURL (デフォルト: "sqlite://healthgate.db")
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// 接続プールの最大接続数 (デフォルト: 5)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// プローブ1件あたりのタイムアウト（ミリ秒）(デフォルト: 3000)
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_grpc_port() -> u16 {
    5000
}

fn default_database_url() -> String {
    "sqlite://healthgate.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            grpc_port: default_grpc_port(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl ServerConfig {
    /// 設定を読み込む
    ///
    /// `file`が指定された場合はそのファイル（拡張子で形式を判定）を必須ソースとして読み込み、
    /// その上から`HEALTHGATE_*`環境変数で上書きする。
    pub fn load(file: Option<&Path>) -> CommonResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| CommonError::Config(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| CommonError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// 値の整合性を検証
    pub fn validate(&self) -> CommonResult<()> {
        if self.http_port == self.grpc_port && self.http_port != 0 {
            return Err(CommonError::Config(format!(
                "http_port and grpc_port must differ (both {})",
                self.http_port
            )));
        }
        if self.max_connections == 0 {
            return Err(CommonError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.probe_timeout_ms == 0 {
            return Err(CommonError::Config(
                "probe_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// HTTPのバインドアドレス
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// gRPCのバインドアドレス
    pub fn grpc_bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }

    /// プローブのタイムアウト
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
