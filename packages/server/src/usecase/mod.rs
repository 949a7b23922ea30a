//! UseCase 層
//!
//! Each use case holds its collaborators as `Arc<dyn Trait>` and is shared
//! through `AppState`.

pub mod connect_client;
pub mod disconnect_client;
pub mod error;
pub mod get_connections;
pub mod get_feedback;
pub mod release_feedback;
pub mod request_feedback;
pub mod route_message;

pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{ConnectError, ReleaseFeedbackError, RequestFeedbackError, RouteError};
pub use get_connections::GetConnectionsUseCase;
pub use get_feedback::GetFeedbackUseCase;
pub use release_feedback::ReleaseFeedbackUseCase;
pub use request_feedback::{DEFAULT_TIMEOUT_SECONDS, FeedbackReceipt, RequestFeedbackUseCase};
pub use route_message::RouteMessageUseCase;
