//! ヘルスチェック
//!
//! 登録済みプローブを並列に実行し、単一の`HealthReport`に集約する。
//! HTTP・gRPCの両アダプタは同じ集約器を共有するため、同時刻の問い合わせは同じ判定になる。

pub mod aggregator;
pub mod database;
pub mod probe;

pub use aggregator::HealthAggregator;
pub use database::DatabaseProbe;
pub use probe::{Probe, ProbeOutcome, ProbeRegistrationError, ProbeSet};
