//! InMemory ConnectionRegistry 実装
//!
//! Every operation is a single critical section; nothing awaits while the
//! lock is held, and iteration always happens on a copied snapshot.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, ConnectionRegistry, PusherChannel, Timestamp};

struct Entry {
    connection: Connection,
    sender: PusherChannel,
}

/// インメモリ ConnectionRegistry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    entries: Mutex<HashMap<ConnectionId, Entry>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
        client_info: Option<serde_json::Value>,
        connected_at: Timestamp,
    ) {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(&connection_id) {
            Some(entry) => {
                entry.sender = sender;
                entry.connection.client_info = client_info;
                tracing::debug!("Connection '{}' re-registered", connection_id);
            }
            None => {
                entries.insert(
                    connection_id,
                    Entry {
                        connection: Connection::new(connection_id, connected_at, client_info),
                        sender,
                    },
                );
                tracing::debug!("Connection '{}' registered", connection_id);
            }
        }
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> bool {
        let removed = self.entries.lock().await.remove(connection_id).is_some();
        if removed {
            tracing::debug!("Connection '{}' unregistered", connection_id);
        }
        removed
    }

    async fn snapshot(&self) -> Vec<(ConnectionId, PusherChannel)> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .map(|(id, entry)| (*id, entry.sender.clone()))
            .collect()
    }

    async fn sender(&self, connection_id: &ConnectionId) -> Option<PusherChannel> {
        let entries = self.entries.lock().await;
        entries.get(connection_id).map(|entry| entry.sender.clone())
    }

    async fn touch(&self, connection_id: &ConnectionId, at: Timestamp) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(connection_id) {
            Some(entry) => {
                entry.connection.last_heartbeat = at;
                true
            }
            None => false,
        }
    }

    async fn count(&self) -> usize {
        self.entries.lock().await.len()
    }

    async fn connections(&self) -> Vec<Connection> {
        let entries = self.entries.lock().await;
        let mut connections: Vec<Connection> = entries
            .values()
            .map(|entry| entry.connection.clone())
            .collect();
        // Oldest first for consistent ordering
        connections.sort_by_key(|c| (c.connected_at, c.id));
        connections
    }

    async fn clear(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let count = entries.len();
        entries.clear();
        count
    }
}
