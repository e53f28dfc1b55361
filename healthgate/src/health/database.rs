//! データベースプローブ

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::probe::{Probe, ProbeOutcome};

/// 接続プール経由で`SELECT 1`を実行するプローブ
#[derive(Clone, Debug)]
pub struct DatabaseProbe {
    pool: SqlitePool,
}

impl DatabaseProbe {
    /// 作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    async fn ping(&self) -> ProbeOutcome {
        match sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => ProbeOutcome::Healthy,
            Err(e) => ProbeOutcome::unhealthy(e.to_string()),
        }
    }
}
