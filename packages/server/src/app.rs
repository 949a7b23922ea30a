//! Composition root: wires the in-memory components into a server.

use std::sync::Arc;

use crate::{
    background::{HeartbeatLoop, ShutdownSignal},
    config::ServerConfig,
    domain::{ConnectionRegistry, FeedbackRepository, MessagePusher},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRegistry, InMemoryFeedbackRepository},
    },
    ui::{AppState, Server},
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetConnectionsUseCase, GetFeedbackUseCase,
        ReleaseFeedbackUseCase, RequestFeedbackUseCase, RouteMessageUseCase,
    },
};

pub struct Application {
    config: ServerConfig,
    state: Arc<AppState>,
    registry: Arc<dyn ConnectionRegistry>,
    repository: Arc<dyn FeedbackRepository>,
    shutdown: Arc<ShutdownSignal>,
}

impl Application {
    pub fn new(config: ServerConfig) -> Self {
        // Initialize dependencies in order:
        // 1. Registry / Store
        // 2. MessagePusher
        // 3. Background tasks
        // 4. UseCases
        // 5. AppState

        // 1. Create Registry and Store (in-memory)
        let registry: Arc<dyn ConnectionRegistry> = Arc::new(InMemoryConnectionRegistry::new());
        let repository: Arc<dyn FeedbackRepository> =
            Arc::new(InMemoryFeedbackRepository::default());

        // 2. Create MessagePusher (WebSocket implementation)
        let message_pusher: Arc<dyn MessagePusher> =
            Arc::new(WebSocketMessagePusher::new(registry.clone()));

        // 3. Heartbeat loop, started lazily by the first connection
        let shutdown = Arc::new(ShutdownSignal::new());
        let heartbeat = Arc::new(HeartbeatLoop::new(
            registry.clone(),
            message_pusher.clone(),
            config.heartbeat_interval,
            shutdown.clone(),
        ));

        // 4. Create UseCases
        let state = Arc::new(AppState {
            config: config.clone(),
            connect_client_usecase: Arc::new(ConnectClientUseCase::new(
                registry.clone(),
                message_pusher.clone(),
                heartbeat,
            )),
            disconnect_client_usecase: Arc::new(DisconnectClientUseCase::new(registry.clone())),
            route_message_usecase: Arc::new(RouteMessageUseCase::new(
                registry.clone(),
                repository.clone(),
                message_pusher.clone(),
            )),
            request_feedback_usecase: Arc::new(RequestFeedbackUseCase::new(
                repository.clone(),
                message_pusher,
                config.default_language,
            )),
            get_feedback_usecase: Arc::new(GetFeedbackUseCase::new(repository.clone())),
            release_feedback_usecase: Arc::new(ReleaseFeedbackUseCase::new(repository.clone())),
            get_connections_usecase: Arc::new(GetConnectionsUseCase::new(registry.clone())),
        });

        Self {
            config,
            state,
            registry,
            repository,
            shutdown,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Use cases, for embedding the coordinator in the same process
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub fn shutdown_signal(&self) -> Arc<ShutdownSignal> {
        self.shutdown.clone()
    }

    pub fn into_server(self) -> Server {
        Server::new(self.state, self.registry, self.repository, self.shutdown)
            .with_janitor(self.config.feedback_ttl, self.config.janitor_interval)
    }
}
