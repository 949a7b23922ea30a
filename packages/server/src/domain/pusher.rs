//! MessagePusher trait: outbound delivery to connected sessions.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// Outbound channel of one session; drained by that session's socket writer
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Sends serialized messages to sessions.
///
/// A failed delivery unregisters the connection as a side effect, so callers
/// must not assume the connection is still registered after an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Send to a single connection
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Send to every registered connection; returns the number of successful sends
    async fn broadcast(&self, content: &str) -> usize;
}
