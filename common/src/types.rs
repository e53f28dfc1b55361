//! 共通型定義
//!
//! ヘルスレポート、ユーザーエンティティ、ページネーション等のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{CommonError, CommonResult};

/// 1ページあたりのデフォルト件数
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// 1ページあたりの最大件数
pub const MAX_PAGE_SIZE: u32 = 100;

/// テキスト属性の最大長（文字数）
pub const MAX_TEXT_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// ヘルス状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// 正常
    Up,
    /// 異常
    Down,
}

impl HealthStatus {
    /// ワイヤ表現（"up" / "down"）
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Up => "up",
            HealthStatus::Down => "down",
        }
    }

    /// 正常かどうか
    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Up)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 単一プローブの結果
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProbeResult {
    /// プローブキー（例: "database"）
    pub key: String,
    /// 正常ならtrue
    pub healthy: bool,
    /// 付加情報（異常時は`message`に理由が入る）
    pub metadata: BTreeMap<String, String>,
}

impl ProbeResult {
    /// 正常結果を作成
    pub fn healthy(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            healthy: true,
            metadata: BTreeMap::new(),
        }
    }

    /// 異常結果を作成（理由は`metadata.message`に格納）
    pub fn unhealthy(key: impl Into<String>, message: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("message".to_string(), message.into());
        Self {
            key: key.into(),
            healthy: false,
            metadata,
        }
    }

    /// 状態
    pub fn status(&self) -> HealthStatus {
        if self.healthy {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        }
    }

    /// 異常理由
    pub fn message(&self) -> Option<&str> {
        self.metadata.get("message").map(String::as_str)
    }
}

/// 集約済みヘルスレポート
///
/// 一度構築したら変更できない。`overall`は常に`probes`から導出される。
/// プローブが0件の場合は何も検証できていないため`Down`とする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    overall: HealthStatus,
    probes: BTreeMap<String, ProbeResult>,
}

impl HealthReport {
    /// プローブ結果からレポートを構築
    pub fn from_results(results: impl IntoIterator<Item = ProbeResult>) -> Self {
        let probes: BTreeMap<String, ProbeResult> = results
            .into_iter()
            .map(|result| (result.key.clone(), result))
            .collect();

        let overall = if !probes.is_empty() && probes.values().all(|r| r.healthy) {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };

        Self { overall, probes }
    }

    /// 全体状態
    pub fn overall(&self) -> HealthStatus {
        self.overall
    }

    /// 全体が正常か
    pub fn is_up(&self) -> bool {
        self.overall.is_up()
    }

    /// プローブ別の結果（キー順）
    pub fn probes(&self) -> &BTreeMap<String, ProbeResult> {
        &self.probes
    }

    /// 指定キーの結果
    pub fn probe(&self, key: &str) -> Option<&ProbeResult> {
        self.probes.get(key)
    }

    /// 異常なプローブの結果
    pub fn failing(&self) -> impl Iterator<Item = &ProbeResult> {
        self.probes.values().filter(|r| !r.healthy)
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// ユーザー
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// 一意識別子（システム採番）
    pub id: Uuid,
    /// 氏名
    pub full_name: String,
    /// メールアドレス（一意）
    pub email: String,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時（常に`created_at`以上）
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 新規ユーザーを構築する
    ///
    /// 必須項目を検証してからIDとタイムスタンプを割り当てる。ストアには触れない。
    pub fn create(data: NewUser, now: DateTime<Utc>) -> CommonResult<Self> {
        let data = data.validated()?;
        Ok(Self {
            id: Uuid::new_v4(),
            full_name: data.full_name,
            email: data.email,
            created_at: now,
            updated_at: now,
        })
    }
}

/// ユーザー作成データ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    /// 氏名
    pub full_name: String,
    /// メールアドレス
    pub email: String,
}

impl NewUser {
    /// 作成データを生成
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
        }
    }

    /// 検証・正規化済みのデータを返す
    pub fn validated(self) -> CommonResult<Self> {
        Ok(Self {
            full_name: validate_full_name(&self.full_name)?,
            email: validate_email(&self.email)?,
        })
    }
}

/// ユーザー部分更新データ（Noneのフィールドは変更なし）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPatch {
    /// 新しい氏名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// 新しいメールアドレス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserPatch {
    /// 氏名を設定
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// メールアドレスを設定
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// 変更なしか
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none()
    }

    /// 検証・正規化済みのデータを返す
    pub fn validated(self) -> CommonResult<Self> {
        Ok(Self {
            full_name: self.full_name.as_deref().map(validate_full_name).transpose()?,
            email: self.email.as_deref().map(validate_email).transpose()?,
        })
    }
}

fn validate_full_name(raw: &str) -> CommonResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CommonError::Validation("full_name is required".to_string()));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(CommonError::Validation(format!(
            "full_name must be at most {} characters",
            MAX_TEXT_LEN
        )));
    }
    Ok(value.to_string())
}

fn validate_email(raw: &str) -> CommonResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CommonError::Validation("email is required".to_string()));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(CommonError::Validation(format!(
            "email must be at most {} characters",
            MAX_TEXT_LEN
        )));
    }
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(value.to_string())
        }
        _ => Err(CommonError::Validation(format!(
            "email '{}' is not a valid address",
            value
        ))),
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// ソート可能なフィールド
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// 作成日時
    CreatedAt,
    /// 更新日時
    UpdatedAt,
    /// 氏名
    FullName,
    /// メールアドレス
    Email,
}

impl SortField {
    /// カラム名
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::FullName => "full_name",
            SortField::Email => "email",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" | "createdAt" => Ok(SortField::CreatedAt),
            "updated_at" | "updatedAt" => Ok(SortField::UpdatedAt),
            "full_name" | "fullName" => Ok(SortField::FullName),
            "email" => Ok(SortField::Email),
            other => Err(CommonError::Validation(format!(
                "unknown sort field '{}'",
                other
            ))),
        }
    }
}

/// ソート方向
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// 昇順
    Asc,
    /// 降順
    Desc,
}

impl SortDirection {
    /// SQLキーワード
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(CommonError::Validation(format!(
                "unknown sort direction '{}'",
                other
            ))),
        }
    }
}

/// ソート指定（フィールド + 方向）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortOrder {
    /// フィールド
    pub field: SortField,
    /// 方向
    pub direction: SortDirection,
}

/// ページネーション要求
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationParams {
    /// 読み飛ばす件数
    #[serde(default)]
    pub skip: u64,
    /// 取得件数（1..=MAX_PAGE_SIZEに丸められる）
    #[serde(default = "default_take")]
    pub take: u32,
    /// ソート順（空の場合は作成日時の降順）
    #[serde(default)]
    pub order_by: Vec<SortOrder>,
}

fn default_take() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            skip: 0,
            take: DEFAULT_PAGE_SIZE,
            order_by: Vec::new(),
        }
    }
}

impl PaginationParams {
    /// skip/takeを指定して生成
    pub fn new(skip: u64, take: u32) -> Self {
        Self {
            skip,
            take,
            order_by: Vec::new(),
        }
    }

    /// ソート順を追加
    pub fn order(mut self, field: SortField, direction: SortDirection) -> Self {
        self.order_by.push(SortOrder { field, direction });
        self
    }

    /// 実際に使用する取得件数
    pub fn effective_take(&self) -> u32 {
        self.take.clamp(1, MAX_PAGE_SIZE)
    }

    /// 実際に使用するソート順
    pub fn effective_order(&self) -> Vec<SortOrder> {
        if self.order_by.is_empty() {
            vec![SortOrder {
                field: SortField::CreatedAt,
                direction: SortDirection::Desc,
            }]
        } else {
            self.order_by.clone()
        }
    }
}

/// ページネーション結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginatedResult<T> {
    /// 取得したデータ（最大`take`件）
    pub data: Vec<T>,
    /// 問い合わせ時点の総件数
    pub total: u64,
    /// 要求されたskip
    pub skip: u64,
    /// 実際に使用したtake
    pub take: u32,
}
