//! プローブ定義

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// プローブ1回分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 正常
    Healthy,
    /// 異常（理由付き）
    Unhealthy {
        /// 異常理由
        reason: String,
    },
}

impl ProbeOutcome {
    /// 異常結果を作成
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        ProbeOutcome::Unhealthy {
            reason: reason.into(),
        }
    }
}

/// 依存先の稼働確認
///
/// 実装は失敗を`ProbeOutcome::Unhealthy`で返す。タイムアウトとパニックは集約器側で扱う。
#[async_trait]
pub trait Probe: Send + Sync {
    /// 依存先に問い合わせる
    async fn ping(&self) -> ProbeOutcome;
}

/// プローブ登録エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeRegistrationError {
    /// キーが空
    #[error("probe key must not be empty")]
    EmptyKey,
    /// キーが重複
    #[error("probe '{0}' is already registered")]
    DuplicateKey(String),
}

/// 起動時に確定するプローブの集合（登録順を保持）
#[derive(Clone, Default)]
pub struct ProbeSet {
    probes: Vec<(String, Arc<dyn Probe>)>,
}

impl ProbeSet {
    /// 空の集合を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// プローブを登録
    pub fn register(
        &mut self,
        key: impl Into<String>,
        probe: Arc<dyn Probe>,
    ) -> Result<(), ProbeRegistrationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ProbeRegistrationError::EmptyKey);
        }
        if self.contains(&key) {
            return Err(ProbeRegistrationError::DuplicateKey(key));
        }
        self.probes.push((key, probe));
        Ok(())
    }

    /// 登録済みか
    pub fn contains(&self, key: &str) -> bool {
        self.probes.iter().any(|(k, _)| k == key)
    }

    /// 登録数
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// 空か
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// 登録済みキー（登録順）
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(|(k, _)| k.as_str())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &Arc<dyn Probe>)> {
        self.probes.iter().map(|(k, p)| (k, p))
    }
}

impl std::fmt::Debug for ProbeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeSet")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
