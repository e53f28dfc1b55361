//! ロギング初期化
//!
//! `tracing-subscriber`のレジストリに`fmt`レイヤーと`EnvFilter`を組み合わせる。
//!
//! - レベル: `HEALTHGATE_LOG_LEVEL`（なければ`RUST_LOG`、どちらもなければ`info`）
//! - 形式: `HEALTHGATE_LOG_FORMAT=json`でJSON出力、それ以外はテキスト

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// ログレベルの環境変数
pub const LOG_LEVEL_ENV: &str = "HEALTHGATE_LOG_LEVEL";

/// ログ形式の環境変数
pub const LOG_FORMAT_ENV: &str = "HEALTHGATE_LOG_FORMAT";

const DEFAULT_LOG_LEVEL: &str = "info";

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人間向けテキスト
    Text,
    /// 1行1JSON
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// 環境変数からフィルタ文字列を決定（HEALTHGATE_LOG_LEVEL → RUST_LOG → info）
fn log_level_from_env() -> String {
    [LOG_LEVEL_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// グローバルなtracingサブスクライバを初期化する
///
/// 既に初期化済みの場合はエラーを返す（プロセス内で1回だけ呼ぶこと）。
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = log_level_from_env();
    let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

    let filter = EnvFilter::try_new(&level)
        .map_err(|e| format!("Invalid log filter '{}': {}", level, e))?;

    let layer = match format {
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .json()
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).try_init()?;

    tracing::debug!(level = %level, format = ?format, "Logging initialized");
    Ok(())
}
