//! CLI module for healthgate
//!
//! Provides command-line interface for the server.

pub mod serve;

use clap::{Parser, Subcommand};

/// healthgate - user directory and health gateway over HTTP and gRPC
#[derive(Parser, Debug)]
#[command(name = "healthgate")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    HEALTHGATE_CONFIG              Configuration file path
    HEALTHGATE_HOST                Bind address (default: 0.0.0.0)
    HEALTHGATE_HTTP_PORT           HTTP listen port (default: 3000)
    HEALTHGATE_GRPC_PORT           gRPC listen port (default: 5000)
    HEALTHGATE_DATABASE_URL        Database URL (default: sqlite://healthgate.db)
    HEALTHGATE_MAX_CONNECTIONS     Database pool size (default: 5)
    HEALTHGATE_PROBE_TIMEOUT_MS    Per-probe timeout in milliseconds (default: 3000)
    HEALTHGATE_LOG_LEVEL           Log level (default: info)
    HEALTHGATE_LOG_FORMAT          Log format: text | json (default: text)
    DATABASE_URL                   Deprecated alias of HEALTHGATE_DATABASE_URL
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP and gRPC servers
    Serve(serve::ServeArgs),
}

impl Cli {
    /// 実行する`serve`引数（サブコマンド省略時はデフォルト）
    pub fn serve_args(&self) -> serve::ServeArgs {
        match &self.command {
            Some(Commands::Serve(args)) => args.clone(),
            None => serve::ServeArgs {
                config: std::env::var_os("HEALTHGATE_CONFIG").map(std::path::PathBuf::from),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["healthgate"]).unwrap();
        assert!(cli.command.is_none());
        let args = cli.serve_args();
        assert_eq!(args.host, None);
        assert_eq!(args.http_port, None);
        assert_eq!(args.grpc_port, None);
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "healthgate",
            "serve",
            "--host",
            "127.0.0.1",
            "--http-port",
            "8080",
            "--grpc-port",
            "9090",
            "--config",
            "/etc/healthgate.toml",
        ])
        .unwrap();

        let args = cli.serve_args();
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.http_port, Some(8080));
        assert_eq!(args.grpc_port, Some(9090));
        assert_eq!(
            args.config.as_deref(),
            Some(std::path::Path::new("/etc/healthgate.toml"))
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["healthgate", "serve", "--http-port", "99999"]).is_err());
    }
}
