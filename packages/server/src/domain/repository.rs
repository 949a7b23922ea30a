//! Repository trait 定義
//!
//! Use cases depend on these interfaces; the infrastructure layer provides
//! the in-memory implementations.

use std::time::Duration;

use async_trait::async_trait;

use super::{
    Connection, ConnectionId, FeedbackOutcome, FeedbackRequest, PusherChannel, RepositoryError,
    RequestId, Timestamp,
};

/// Live sessions and their metadata.
///
/// Knows nothing about feedback semantics.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Add a connection; registering the same id again overwrites its sender and info
    async fn register(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
        client_info: Option<serde_json::Value>,
        connected_at: Timestamp,
    );

    /// Remove a connection; returns `false` if it was not registered
    async fn unregister(&self, connection_id: &ConnectionId) -> bool;

    /// Point-in-time copy of all connections and their senders
    async fn snapshot(&self) -> Vec<(ConnectionId, PusherChannel)>;

    async fn sender(&self, connection_id: &ConnectionId) -> Option<PusherChannel>;

    /// Record a heartbeat; returns `false` if the connection is unknown
    async fn touch(&self, connection_id: &ConnectionId, at: Timestamp) -> bool;

    async fn count(&self) -> usize;

    async fn connections(&self) -> Vec<Connection>;

    /// Drop every connection; returns how many were registered
    async fn clear(&self) -> usize;
}

/// Feedback store: request id to request state.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn get(&self, request_id: &RequestId) -> Option<FeedbackRequest>;

    /// Register a waiting request; an existing entry is left untouched and returned
    async fn insert_waiting(&self, request_id: RequestId, timeout_seconds: u64)
    -> FeedbackRequest;

    /// Apply a terminal outcome. The first terminal write for an id wins.
    async fn resolve(
        &self,
        request_id: RequestId,
        outcome: FeedbackOutcome,
    ) -> Result<FeedbackRequest, RepositoryError>;

    async fn remove(&self, request_id: &RequestId) -> Option<FeedbackRequest>;

    /// Drop entries created more than `ttl` ago; returns how many were removed
    async fn purge_expired(&self, ttl: Duration) -> usize;

    async fn count(&self) -> usize;
}
