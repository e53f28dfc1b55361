//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化

/// ユーザー管理
pub mod users;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;

use healthgate_common::error::{CommonError, GateError, GateResult};
use sqlx::error::DatabaseError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// データベース接続プールを作成
///
/// インメモリDBは接続ごとに別DBになるため、接続数を1に固定して保持し続ける。
///
/// # Arguments
/// * `database_url` - データベースURL（例: "sqlite://healthgate.db", "sqlite::memory:"）
/// * `max_connections` - 最大接続数
pub async fn create_pool(database_url: &str, max_connections: u32) -> GateResult<SqlitePool> {
    if !database_url.starts_with("sqlite:") {
        return Err(CommonError::Config(format!(
            "unsupported database URL '{}': only sqlite is supported",
            database_url
        ))
        .into());
    }

    let connect_options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| classify_error(e, "Invalid database URL"))?
        .create_if_missing(true);

    let in_memory = is_in_memory(database_url);
    let mut pool_options = SqlitePoolOptions::new();
    if in_memory {
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        pool_options = pool_options.max_connections(max_connections.max(1));
    }

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .map_err(|e| classify_error(e, "Failed to connect to database"))?;

    info!(in_memory, "Database pool created");
    Ok(pool)
}

/// マイグレーションを実行（sqlx::migrate!マクロを使用）
pub async fn run_migrations(pool: &SqlitePool) -> GateResult<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| GateError::Database(format!("Failed to run migrations: {}", e)))?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// 接続プールを作成してマイグレーションまで済ませる
pub async fn initialize_database(database_url: &str, max_connections: u32) -> GateResult<SqlitePool> {
    let pool = create_pool(database_url, max_connections).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// sqlxのエラーをサービスのエラー種別に分類する
///
/// - 一意制約違反 → `ConstraintViolation`
/// - I/O・TLS・プール枯渇/クローズ、SQLiteのロック競合（BUSY/LOCKED） → `StoreUnavailable`
/// - それ以外 → `Database`
pub(crate) fn classify_error(err: sqlx::Error, context: &str) -> GateError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            GateError::ConstraintViolation(format!("{}: {}", context, db_err.message()))
        }
        sqlx::Error::Database(db_err) if is_lock_contention(db_err.as_ref()) => {
            GateError::StoreUnavailable(format!("{}: {}", context, err))
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => GateError::StoreUnavailable(format!("{}: {}", context, err)),
        _ => GateError::Database(format!("{}: {}", context, err)),
    }
}

// SQLITE_BUSY(5) / SQLITE_LOCKED(6)。拡張コードは下位8ビットが基本コード
fn is_lock_contention(db_err: &dyn DatabaseError) -> bool {
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| matches!(code & 0xff, 5 | 6))
        .unwrap_or(false)
}
