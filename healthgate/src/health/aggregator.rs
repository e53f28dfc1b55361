//! ヘルス集約器
//!
//! 全プローブを並列に実行し、結果を1つのレポートにまとめる。
//! プローブごとに別タスクで実行し、それぞれにタイムアウトを掛ける。

use healthgate_common::types::{HealthReport, ProbeResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::probe::{ProbeOutcome, ProbeSet};

/// プローブ1件あたりのデフォルトタイムアウト
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// ヘルス集約器
///
/// プローブ集合は起動時に確定し、以後は読み取り専用で共有される。
#[derive(Clone, Debug)]
pub struct HealthAggregator {
    probes: Arc<ProbeSet>,
    timeout: Duration,
}

impl HealthAggregator {
    /// デフォルトタイムアウトで作成
    pub fn new(probes: ProbeSet) -> Self {
        Self::with_timeout(probes, DEFAULT_PROBE_TIMEOUT)
    }

    /// タイムアウトを指定して作成
    pub fn with_timeout(probes: ProbeSet, timeout: Duration) -> Self {
        Self {
            probes: Arc::new(probes),
            timeout,
        }
    }

    /// プローブ1件あたりのタイムアウト
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 登録済みプローブ数
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// 全プローブを実行してレポートを返す
    ///
    /// 失敗はすべてレポート内の`down`として表現され、この関数自体は失敗しない。
    /// プローブが0件の場合は`down`。
    pub async fn check(&self) -> HealthReport {
        if self.probes.is_empty() {
            warn!("No health probes registered; reporting down");
            return HealthReport::from_results(Vec::new());
        }

        let started = Instant::now();
        let mut handles = Vec::with_capacity(self.probes.len());

        for (key, probe) in self.probes.iter() {
            let probe = Arc::clone(probe);
            let timeout = self.timeout;
            handles.push((
                key.clone(),
                tokio::spawn(async move { tokio::time::timeout(timeout, probe.ping()).await }),
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (key, handle) in handles {
            let result = match handle.await {
                Ok(Ok(ProbeOutcome::Healthy)) => {
                    debug!(probe = %key, "Probe healthy");
                    ProbeResult::healthy(key)
                }
                Ok(Ok(ProbeOutcome::Unhealthy { reason })) => {
                    warn!(probe = %key, reason = %reason, "Probe unhealthy");
                    ProbeResult::unhealthy(key, reason)
                }
                Ok(Err(_elapsed)) => {
                    warn!(
                        probe = %key,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Probe timed out"
                    );
                    ProbeResult::unhealthy(
                        key,
                        format!("timed out after {}ms", self.timeout.as_millis()),
                    )
                }
                Err(e) => {
                    error!(probe = %key, "Probe task join error: {}", e);
                    let reason = if e.is_panic() {
                        "probe task failed: panicked"
                    } else {
                        "probe task failed: cancelled"
                    };
                    ProbeResult::unhealthy(key, reason)
                }
            };
            results.push(result);
        }

        let report = HealthReport::from_results(results);
        info!(
            status = %report.overall(),
            probes = report.probes().len(),
            failing = report.failing().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Health check completed"
        );
        report
    }
}
