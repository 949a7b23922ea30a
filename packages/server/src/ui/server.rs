//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    background::{FeedbackJanitor, ShutdownSignal},
    domain::{ConnectionRegistry, FeedbackRepository},
};

use super::{
    handler::{
        debug_connections, get_feedback, health_check, release_feedback, request_feedback,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Feedback collector HTTP/WebSocket server
///
/// # Example
///
/// ```ignore
/// let server = Application::new(ServerConfig::default()).into_server();
/// server.run("127.0.0.1", 9999).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    registry: Arc<dyn ConnectionRegistry>,
    repository: Arc<dyn FeedbackRepository>,
    shutdown: Arc<ShutdownSignal>,
    feedback_ttl: Option<Duration>,
    janitor_interval: Duration,
}

impl Server {
    pub fn new(
        state: Arc<AppState>,
        registry: Arc<dyn ConnectionRegistry>,
        repository: Arc<dyn FeedbackRepository>,
        shutdown: Arc<ShutdownSignal>,
    ) -> Self {
        Self {
            state,
            registry,
            repository,
            shutdown,
            feedback_ttl: None,
            janitor_interval: Duration::from_secs(60),
        }
    }

    /// Purge store entries older than `ttl` every `interval`
    #[must_use]
    pub fn with_janitor(mut self, ttl: Option<Duration>, interval: Duration) -> Self {
        self.feedback_ttl = ttl;
        self.janitor_interval = interval;
        self
    }

    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/request_feedback", post(request_feedback))
            .route(
                "/api/feedback/{request_id}",
                get(get_feedback).delete(release_feedback),
            )
            .route("/health", get(health_check))
            .route("/debug/connections", get(debug_connections))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to `host:port` and serve until Ctrl+C or SIGTERM
    pub async fn run(self, host: &str, port: u16) -> Result<(), ServerError> {
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `signal` resolves
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        if let Some(ttl) = self.feedback_ttl {
            let janitor = FeedbackJanitor::new(
                self.repository.clone(),
                ttl,
                self.janitor_interval,
                self.shutdown.subscribe(),
            );
            tokio::spawn(janitor.run());
        }

        let local_addr = listener.local_addr()?;
        tracing::info!("Feedback collector listening on http://{}", local_addr);
        tracing::info!("Sessions connect to: ws://{}/ws", local_addr);

        let shutdown = self.shutdown.clone();
        let registry = self.registry.clone();
        let graceful = async move {
            signal.await;
            shutdown.trigger();
            // Dropping the senders ends every pusher loop, which closes the sockets
            let closed = registry.clear().await;
            tracing::info!("Closed {} connection(s)", closed);
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(graceful)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
