//! Repository traitパターン定義
//!
//! DB操作を抽象化し、プロトコルアダプタからストア実装を切り離すためのtrait。
//! 実装は`db::users`のフリー関数に委譲する。

use async_trait::async_trait;
use healthgate_common::error::GateResult;
use healthgate_common::types::{NewUser, PaginatedResult, PaginationParams, User, UserPatch};
use sqlx::SqlitePool;
use uuid::Uuid;

/// ユーザーCRUD操作のRepository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// IDで検索（存在しなければNone）
    async fn find_by_id(&self, id: Uuid) -> GateResult<Option<User>>;
    /// メールアドレスで検索（存在しなければNone）
    async fn find_by_email(&self, email: &str) -> GateResult<Option<User>>;
    /// 作成
    async fn create(&self, data: NewUser) -> GateResult<User>;
    /// 部分更新
    async fn update(&self, id: Uuid, patch: UserPatch) -> GateResult<User>;
    /// 削除
    async fn delete(&self, id: Uuid) -> GateResult<()>;
    /// ページ取得
    async fn find_all(&self, params: &PaginationParams) -> GateResult<PaginatedResult<User>>;
    /// 総数
    async fn count(&self) -> GateResult<u64>;
}

#[async_trait]
impl UserRepository for SqlitePool {
    async fn find_by_id(&self, id: Uuid) -> GateResult<Option<User>> {
        super::users::find_by_id(self, id).await
    }

    async fn find_by_email(&self, email: &str) -> GateResult<Option<User>> {
        super::users::find_by_email(self, email).await
    }

    async fn create(&self, data: NewUser) -> GateResult<User> {
        super::users::create(self, data).await
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> GateResult<User> {
        super::users::update(self, id, patch).await
    }

    async fn delete(&self, id: Uuid) -> GateResult<()> {
        super::users::delete(self, id).await
    }

    async fn find_all(&self, params: &PaginationParams) -> GateResult<PaginatedResult<User>> {
        super::users::find_all(self, params).await
    }

    async fn count(&self) -> GateResult<u64> {
        super::users::count(self).await
    }
}
