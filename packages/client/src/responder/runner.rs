//! Responder execution logic with reconnection support.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::error::ClientError;

use super::{command::Draft, session::run_responder_session, ui::spawn_readline};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Delay before the `attempt`-th reconnection, doubling from one second
pub fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    INITIAL_BACKOFF.saturating_mul(factor).min(MAX_BACKOFF)
}

/// WebSocket endpoint for a server base URL (`http://host:port` becomes
/// `ws://host:port/ws`)
pub fn websocket_url(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let base_url = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base_url.to_string()
    };
    if base_url.ends_with("/ws") {
        base_url
    } else {
        format!("{}/ws", base_url)
    }
}

/// Run the terminal responder, reconnecting when the connection drops.
///
/// The draft and any queued requests survive reconnection.
pub async fn run_responder(base_url: &str, auto_append: bool) -> Result<(), ClientError> {
    let url = format!("{}?client=terminal", websocket_url(base_url));
    let draft = Arc::new(Mutex::new(Draft::new(auto_append)));
    let mut input_rx = spawn_readline();
    let mut failures = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            url,
            failures + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_responder_session(&url, draft.clone(), &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Responder session ended normally");
                return Ok(());
            }
            Err(ClientError::ConnectionLost) => {
                tracing::warn!("Connection lost");
                // The connection was up, so start counting again
                failures = 0;
            }
            Err(e) => tracing::warn!("{}", e),
        }

        failures += 1;
        if failures >= MAX_RECONNECT_ATTEMPTS {
            return Err(ClientError::ReconnectExhausted(MAX_RECONNECT_ATTEMPTS));
        }

        let delay = backoff_delay(failures);
        tracing::info!(
            "Reconnecting in {:?}... (attempt {}/{})",
            delay,
            failures + 1,
            MAX_RECONNECT_ATTEMPTS
        );
        tokio::time::sleep(delay).await;
    }
}
