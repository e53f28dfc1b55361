//! healthgate 共通クレート
//!
//! ヘルスチェック・ユーザーリポジトリの両コアで共有する型、エラー、設定

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// 共通型定義
pub mod types;
