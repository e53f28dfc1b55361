//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `GateError`はリポジトリ層からgRPCアダプタまで伝播するエラー。
//! アダプタがバリアントごとにステータスコードへ変換する。ストア系の失敗は`external_message()`で汎用化する。
//! プローブの失敗はここには含まれない（ヘルス集約器の内部で`Unhealthy`として吸収される）。

use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// healthgate service error type
#[derive(Debug, Error)]
pub enum GateError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness constraint broken
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transport-level failure talking to the store
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any other store failure
    #[error("Database error: {0}")]
    Database(String),
}

impl GateError {
    /// Returns a safe error message for external clients.
    ///
    /// Store and internal failures are reduced to a generic message; the full
    /// `Display` output is meant for server logs only.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(CommonError::Validation(_)) => "Invalid request",
            Self::Common(CommonError::Config(_)) => "Internal server error",
            Self::NotFound(_) => "Not found",
            Self::ConstraintViolation(_) => "Already exists",
            Self::StoreUnavailable(_) => "Service temporarily unavailable",
            Self::Database(_) => "Database error",
        }
    }
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (service)
pub type GateResult<T> = Result<T, GateError>;
