// ユーザーCRUD操作

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use healthgate_common::error::{GateError, GateResult};
use healthgate_common::types::{NewUser, PaginatedResult, PaginationParams, User, UserPatch};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::classify_error;

const USER_COLUMNS: &str = "id, full_name, email, created_at, updated_at";

/// 保存精度（マイクロ秒）に丸めた現在時刻
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// 固定長のRFC3339文字列（文字列比較で時刻順に並ぶ）
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// ユーザーを作成
///
/// # Arguments
/// * `pool` - データベース接続プール
/// * `data` - 作成データ（検証前）
///
/// # Returns
/// * `Ok(User)` - 作成されたユーザー
/// * `Err(GateError)` - 検証失敗、メールアドレス重複など
pub async fn create(pool: &SqlitePool, data: NewUser) -> GateResult<User> {
    create_at(pool, data, now()).await
}

/// 作成日時を指定してユーザーを作成（テスト用）
pub async fn create_at(
    pool: &SqlitePool,
    data: NewUser,
    created_at: DateTime<Utc>,
) -> GateResult<User> {
    let user = User::create(data, created_at.trunc_subsecs(6))?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| classify_error(e, "Failed to begin transaction"))?;

    sqlx::query(
        "INSERT INTO users (id, full_name, email, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user.id.to_string())
    .bind(&user.full_name)
    .bind(&user.email)
    .bind(format_timestamp(&user.created_at))
    .bind(format_timestamp(&user.updated_at))
    .execute(&mut *tx)
    .await
    .map_err(|e| email_conflict(e, &user.email, "Failed to create user"))?;

    tx.commit()
        .await
        .map_err(|e| classify_error(e, "Failed to commit user creation"))?;

    info!(user_id = %user.id, "User created");
    Ok(user)
}

/// IDでユーザーを検索
///
/// # Returns
/// * `Ok(Some(User))` - ユーザーが見つかった
/// * `Ok(None)` - ユーザーが見つからなかった
/// * `Err(GateError)` - 検索失敗
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> GateResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| classify_error(e, "Failed to find user"))?;

    row.map(UserRow::try_into_user).transpose()
}

/// メールアドレスでユーザーを検索（前後の空白は無視）
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> GateResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email.trim())
    .fetch_optional(pool)
    .await
    .map_err(|e| classify_error(e, "Failed to find user by email"))?;

    row.map(UserRow::try_into_user).transpose()
}

/// ユーザーを部分更新
///
/// 指定されたフィールドのみを1文の`UPDATE ... RETURNING`で上書きする。
/// 同時更新は後勝ち（楽観ロックなし）。
///
/// # Returns
/// * `Ok(User)` - 更新後のユーザー
/// * `Err(GateError::NotFound)` - ユーザーが存在しない
/// * `Err(GateError::ConstraintViolation)` - メールアドレスが他ユーザーと重複
pub async fn update(pool: &SqlitePool, id: Uuid, patch: UserPatch) -> GateResult<User> {
    update_at(pool, id, patch, now()).await
}

/// 更新日時を指定してユーザーを部分更新（テスト用）
///
/// `updated_at`は既存値より前には戻らない。
pub async fn update_at(
    pool: &SqlitePool,
    id: Uuid,
    patch: UserPatch,
    updated_at: DateTime<Utc>,
) -> GateResult<User> {
    // ストアに触れる前に検証する
    let patch = patch.validated().map_err(GateError::from)?;

    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET full_name = COALESCE(?, full_name), email = COALESCE(?, email), \
         updated_at = MAX(?, updated_at) WHERE id = ? RETURNING {}",
        USER_COLUMNS
    ))
    .bind(patch.full_name.as_deref())
    .bind(patch.email.as_deref())
    .bind(format_timestamp(&updated_at.trunc_subsecs(6)))
    .bind(id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        email_conflict(
            e,
            patch.email.as_deref().unwrap_or_default(),
            "Failed to update user",
        )
    })?;

    let user = row
        .ok_or_else(|| GateError::NotFound(format!("user {}", id)))?
        .try_into_user()?;

    info!(user_id = %id, "User updated");
    Ok(user)
}

/// ユーザーを削除
///
/// # Returns
/// * `Ok(())` - 削除成功
/// * `Err(GateError::NotFound)` - ユーザーが存在しない
pub async fn delete(pool: &SqlitePool, id: Uuid) -> GateResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| classify_error(e, "Failed to delete user"))?;

    if result.rows_affected() == 0 {
        return Err(GateError::NotFound(format!("user {}", id)));
    }

    info!(user_id = %id, "User deleted");
    Ok(())
}

/// ページ単位でユーザーを取得
///
/// ソート列はホワイトリスト（`SortField::column`）からのみ組み立てる。
/// 同値の行は`id`で順序を固定し、ページ間で重複・欠落が起きないようにする。
/// 件数取得とページ取得は同じトランザクション内で行う。
pub async fn find_all(
    pool: &SqlitePool,
    params: &PaginationParams,
) -> GateResult<PaginatedResult<User>> {
    let take = params.effective_take();
    let order = params.effective_order();

    let mut clauses: Vec<String> = order
        .iter()
        .map(|o| format!("{} {}", o.field.column(), o.direction.keyword()))
        .collect();
    let tie_break = order
        .first()
        .map(|o| o.direction.keyword())
        .unwrap_or("DESC");
    clauses.push(format!("id {}", tie_break));

    let sql = format!(
        "SELECT {} FROM users ORDER BY {} LIMIT ? OFFSET ?",
        USER_COLUMNS,
        clauses.join(", ")
    );
    debug!(sql = %sql, skip = params.skip, take, "Listing users");

    let offset = i64::try_from(params.skip).unwrap_or(i64::MAX);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| classify_error(e, "Failed to begin transaction"))?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify_error(e, "Failed to count users"))?;

    let rows = sqlx::query_as::<_, UserRow>(&sql)
        .bind(i64::from(take))
        .bind(offset)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| classify_error(e, "Failed to list users"))?;

    tx.commit()
        .await
        .map_err(|e| classify_error(e, "Failed to finish user listing"))?;

    let data = rows
        .into_iter()
        .map(UserRow::try_into_user)
        .collect::<GateResult<Vec<_>>>()?;

    Ok(PaginatedResult {
        data,
        total: total.max(0) as u64,
        skip: params.skip,
        take,
    })
}

/// ユーザー総数
pub async fn count(pool: &SqlitePool) -> GateResult<u64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(|e| classify_error(e, "Failed to count users"))?;

    Ok(total.max(0) as u64)
}

fn email_conflict(err: sqlx::Error, email: &str, context: &str) -> GateError {
    match classify_error(err, context) {
        GateError::ConstraintViolation(_) => {
            GateError::ConstraintViolation(format!("email '{}' already exists", email))
        }
        other => other,
    }
}

// SQLiteの行からUserへの変換用の中間構造体
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    full_name: String,
    email: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn try_into_user(self) -> GateResult<User> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| GateError::Database(format!("Invalid user id '{}': {}", self.id, e)))?;
        Ok(User {
            id,
            full_name: self.full_name,
            email: self.email,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> GateResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GateError::Database(format!("Invalid timestamp '{}': {}", raw, e)))
}
