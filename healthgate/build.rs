//! gRPCコード生成
//!
//! `proto/healthgate.proto`からメッセージ型とサービススタブ（サーバー/クライアント）を生成する。
//! 生成物は`$OUT_DIR/healthgate.v1.rs`に出力され、`src/grpc/mod.rs`で`include_proto!`される。
//!
//! protocはprotoc-bin-vendoredの同梱バイナリを使うため、システムへのインストールは不要。

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/healthgate.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/healthgate.proto");
    Ok(())
}
