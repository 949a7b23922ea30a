//! WebSocket session handler.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{domain::ConnectionId, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let client_info = client_info_from_query(query);
    ws.on_upgrade(move |socket| handle_socket(socket, state, client_info))
}

/// Upgrade query parameters become the session's client info
fn client_info_from_query(query: HashMap<String, String>) -> Option<serde_json::Value> {
    if query.is_empty() {
        return None;
    }
    let object = query
        .into_iter()
        .map(|(key, value)| (key, serde_json::Value::String(value)))
        .collect();
    Some(serde_json::Value::Object(object))
}

/// Spawns a task that drains the connection's channel into the WebSocket sink.
///
/// Ends when the sink fails or every sender has been dropped, i.e. the
/// connection was unregistered.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    client_info: Option<serde_json::Value>,
) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    // The outbound loop must be running before anything is pushed
    let (tx, rx) = mpsc::unbounded_channel();
    let mut send_task = pusher_loop(rx, sender);

    if let Err(e) = state
        .connect_client_usecase
        .execute(connection_id, tx, client_info)
        .await
    {
        tracing::warn!("Failed to set up connection {}: {}", connection_id, e);
        send_task.abort();
        return;
    }
    tracing::info!("Connection {} established", connection_id);

    let router = state.route_message_usecase.clone();

    // Frames are handled one at a time, in arrival order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on {}: {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received frame from {}: {}", connection_id, text.as_str());
                    if let Err(e) = router.execute(&connection_id, text.as_str()).await {
                        tracing::warn!("Failed to reply to {}: {}", connection_id, e);
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", connection_id);
                    break;
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from {}", connection_id);
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_client_usecase
        .execute(&connection_id)
        .await;
    tracing::info!("Connection {} closed", connection_id);
}
