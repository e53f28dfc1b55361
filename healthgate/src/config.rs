//! 設定管理
//!
//! `healthgate_common::config::ServerConfig`の読み込みに、
//! 旧環境変数のフォールバックとCLIによる上書きを加える。

use healthgate_common::config::ServerConfig;
use healthgate_common::error::CommonResult;
use std::path::Path;

/// 旧形式のデータベースURL環境変数
pub const LEGACY_DATABASE_URL_ENV: &str = "DATABASE_URL";

/// 新しい環境変数を優先し、なければ旧環境変数を読む
///
/// 旧環境変数が使われた場合は非推奨の警告を出す。
///
/// # Arguments
/// * `new_name` - The new environment variable name (preferred)
/// * `old_name` - The deprecated environment variable name (fallback)
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// CLIからの上書き値
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// バインドアドレス
    pub host: Option<String>,
    /// HTTPポート
    pub http_port: Option<u16>,
    /// gRPCポート
    pub grpc_port: Option<u16>,
}

/// 設定を読み込む
///
/// デフォルト ← 設定ファイル ← `HEALTHGATE_*` ← CLI上書き の順に適用する。
/// `HEALTHGATE_DATABASE_URL`が無く`DATABASE_URL`がある場合はそちらを使う。
pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> CommonResult<ServerConfig> {
    let mut config = ServerConfig::load(file)?;

    if std::env::var("HEALTHGATE_DATABASE_URL").is_err() {
        if let Some(url) = get_env_with_fallback("HEALTHGATE_DATABASE_URL", LEGACY_DATABASE_URL_ENV)
        {
            config.database_url = url;
        }
    }

    apply_overrides(&mut config, overrides);
    config.validate()?;
    Ok(config)
}

/// CLI上書きを適用
pub fn apply_overrides(config: &mut ServerConfig, overrides: &ConfigOverrides) {
    if let Some(host) = &overrides.host {
        config.host = host.clone();
    }
    if let Some(port) = overrides.http_port {
        config.http_port = port;
    }
    if let Some(port) = overrides.grpc_port {
        config.grpc_port = port;
    }
}
