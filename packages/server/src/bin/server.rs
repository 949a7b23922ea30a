//! Feedback collector server.
//!
//! Browser sessions connect over WebSocket; callers create feedback requests
//! and poll for answers over HTTP.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin feedback-collector-server
//! cargo run --bin feedback-collector-server -- --host 0.0.0.0 --port 3000 --language EN
//! ```

use std::time::Duration;

use clap::Parser;
use feedback_collector_server::{Application, ServerConfig, domain::Language};
use feedback_collector_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "feedback-collector-server")]
#[command(about = "Collects human feedback from browser sessions over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "WEB_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "WEB_PORT", default_value = "9999")]
    port: u16,

    /// Seconds between heartbeat requests
    #[arg(long, env = "WS_HEARTBEAT_INTERVAL", default_value = "30")]
    heartbeat_interval: u64,

    /// Default language for feedback requests (CN or EN)
    #[arg(short = 'l', long, env = "LANGUAGE", default_value = "CN")]
    language: Language,

    /// Seconds to keep feedback entries before purging them (0 keeps them forever)
    #[arg(long, env = "FEEDBACK_TTL", default_value = "0")]
    feedback_ttl: u64,

    /// Seconds between purge sweeps
    #[arg(long, default_value = "60")]
    janitor_interval: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = ServerConfig::new(args.host.clone(), args.port)
        .with_heartbeat_interval(Duration::from_secs(args.heartbeat_interval.max(1)))
        .with_default_language(args.language)
        .with_feedback_ttl(Duration::from_secs(args.feedback_ttl))
        .with_janitor_interval(Duration::from_secs(args.janitor_interval.max(1)));
    tracing::debug!("Server config: {:?}", config);

    let server = Application::new(config).into_server();
    if let Err(e) = server.run(&args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
