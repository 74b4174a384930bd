//! Tsunagi relay server.
//!
//! Persists every message it receives and forwards it to the addressed client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsunagi-server
//! cargo run --bin tsunagi-server -- --host 0.0.0.0 --port 3000
//! TSUNAGI_ALLOWED_ORIGINS=https://app.example.com cargo run --bin tsunagi-server
//! ```

use std::time::Duration;

use clap::Parser;
use tsunagi_server::{
    bootstrap,
    config::{
        DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_PERSISTENCE_TIMEOUT_SECS, DEFAULT_PORT,
        ServerConfig, parse_origins,
    },
};
use tsunagi_shared::logger::setup_logger;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tsunagi-server")]
#[command(about = "Real-time message relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TSUNAGI_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TSUNAGI_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Comma separated list of allowed CORS origins (empty allows any origin)
    #[arg(long, env = "TSUNAGI_ALLOWED_ORIGINS", default_value = "")]
    allowed_origins: String,

    /// Timeout in seconds for a single persistence call
    #[arg(long, env = "TSUNAGI_PERSISTENCE_TIMEOUT_SECS", default_value_t = DEFAULT_PERSISTENCE_TIMEOUT_SECS)]
    persistence_timeout_secs: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "TSUNAGI_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            allowed_origins: parse_origins(&args.allowed_origins),
            persistence_timeout: Duration::from_secs(args.persistence_timeout_secs),
            log_level: args.log_level,
            instance_id: Uuid::new_v4(),
        }
    }
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::from(Args::parse());
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    // Initialize tracing
    setup_logger(
        &[env!("CARGO_BIN_NAME"), "tsunagi_shared", "tower_http"],
        &config.log_level,
    );
    tracing::info!("Starting relay instance {}", config.instance_id);

    let server = bootstrap::build(&config);
    if let Err(e) = server.run(&config.bind_addr()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
