//! Feedback collector client.
//!
//! `collect` asks connected sessions for feedback and prints the answer;
//! `respond` answers feedback requests from the terminal.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin feedback-collector-client -- collect --timeout 120
//! cargo run --bin feedback-collector-client -- --language EN respond
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use feedback_collector_client::{
    content::ContentItem,
    coordinator::{FeedbackResult, FeedbackResultKind, RequestCoordinator},
    gateway::HttpFeedbackGateway,
    responder::run_responder,
};
use feedback_collector_server::domain::Language;
use feedback_collector_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "feedback-collector-client")]
#[command(about = "Requests and answers feedback through a feedback collector server", long_about = None)]
struct Args {
    /// Base URL of the feedback collector server
    #[arg(short = 'u', long, global = true, env = "WEB_BASE_URL", default_value = "http://127.0.0.1:9999")]
    server_url: String,

    /// Language of the request and of the rendered messages (CN or EN)
    #[arg(short = 'l', long, global = true, env = "LANGUAGE", default_value = "CN")]
    language: Language,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Request feedback and wait for the first answer
    Collect {
        /// Seconds to wait for an answer
        #[arg(short = 't', long, env = "FEEDBACK_TIMEOUT", default_value = "600")]
        timeout: u64,

        /// Seconds between polls
        #[arg(long, default_value = "2")]
        poll_interval: u64,

        /// Directory to write received images to
        #[arg(short = 'o', long)]
        output_dir: Option<PathBuf>,
    },
    /// Answer feedback requests from this terminal
    Respond {
        /// Start with the auto-append prompt enabled
        #[arg(long)]
        auto_append: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    match args.command {
        Mode::Collect {
            timeout,
            poll_interval,
            output_dir,
        } => {
            let gateway = Arc::new(HttpFeedbackGateway::new(args.server_url));
            let coordinator = RequestCoordinator::new(gateway)
                .with_poll_interval(Duration::from_secs(poll_interval.max(1)))
                .with_language(args.language);

            let result = coordinator
                .collect_feedback(Duration::from_secs(timeout.max(1)))
                .await;
            print_result(&result, output_dir.as_deref()).await;

            if !matches!(
                result.kind,
                FeedbackResultKind::Completed | FeedbackResultKind::Cancelled
            ) {
                std::process::exit(1);
            }
        }
        Mode::Respond { auto_append } => {
            if let Err(e) = run_responder(&args.server_url, auto_append).await {
                tracing::error!("Responder error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn print_result(result: &FeedbackResult, output_dir: Option<&std::path::Path>) {
    let mut image_index = 0;
    for item in &result.content {
        match item {
            ContentItem::Text(text) => println!("{}", text),
            ContentItem::Image { data, format } => {
                image_index += 1;
                let Some(dir) = output_dir else {
                    println!("[image {}: {} bytes, {}]", image_index, data.len(), format.mime_type());
                    continue;
                };
                let path = dir.join(format!(
                    "{}-{}.{}",
                    result.request_id,
                    image_index,
                    format.as_str()
                ));
                match tokio::fs::write(&path, data).await {
                    Ok(()) => println!("[image {} saved to {}]", image_index, path.display()),
                    Err(e) => {
                        tracing::error!("Failed to write {}: {}", path.display(), e);
                        println!("[image {}: {} bytes, not saved]", image_index, data.len());
                    }
                }
            }
        }
    }
}
