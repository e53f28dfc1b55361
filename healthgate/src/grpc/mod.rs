//! gRPCサービス
//!
//! `healthgate.v1.HealthService`と`healthgate.v1.UserService`を提供する。
//! メッセージ型とサービススタブは`proto/healthgate.proto`からbuild.rsで生成される。

#![allow(missing_docs)]

pub mod conversions;
pub mod health;
pub mod server;
pub mod users;

/// `healthgate.v1`の生成コード（メッセージ型・サーバー/クライアントスタブ）
pub mod proto {
    tonic::include_proto!("healthgate.v1");
}

pub use health::HealthServiceImpl;
pub use server::{serve, serve_with_listener};
pub use users::UserServiceImpl;
