//! WebSocket session of the terminal responder.

use std::sync::Arc;

use feedback_collector_server::infrastructure::dto::websocket::{ClientMessage, ServerMessage};
use feedback_collector_shared::time::now_rfc3339;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::error::ClientError;

use super::{
    attachment::load_image,
    command::{Command, Draft, PendingRequest},
    formatter::ResponderFormatter,
    ui::redisplay_prompt,
};

/// What a server frame means for the terminal: something to print and/or
/// something to send back
#[derive(Debug, Default, PartialEq)]
pub struct FrameEffect {
    pub output: Option<String>,
    pub reply: Option<ClientMessage>,
}

/// Apply one server frame to the draft
pub fn apply_server_frame(text: &str, draft: &mut Draft) -> FrameEffect {
    let Ok(message) = serde_json::from_str::<ServerMessage>(text) else {
        return FrameEffect {
            output: Some(ResponderFormatter::format_raw_message(text)),
            reply: None,
        };
    };

    match message {
        ServerMessage::ConnectionEstablished { connection_id, .. } => FrameEffect {
            output: Some(ResponderFormatter::format_connected(&connection_id)),
            reply: None,
        },
        ServerMessage::HeartbeatRequest { .. } => FrameEffect {
            output: None,
            reply: Some(ClientMessage::Heartbeat {
                timestamp: Some(now_rfc3339()),
            }),
        },
        ServerMessage::HeartbeatResponse { .. } => FrameEffect::default(),
        ServerMessage::RequestFeedback {
            id,
            timeout,
            language,
            ..
        } => {
            draft.enqueue(PendingRequest::new(id.clone(), timeout, language));
            FrameEffect {
                output: Some(ResponderFormatter::format_request(
                    &id,
                    timeout,
                    language,
                    draft.pending_count(),
                )),
                reply: None,
            }
        }
        ServerMessage::FeedbackReceived { request_id, .. } => FrameEffect {
            output: Some(ResponderFormatter::format_received(&request_id)),
            reply: None,
        },
        ServerMessage::FeedbackCancelled { request_id, .. } => FrameEffect {
            output: Some(ResponderFormatter::format_cancelled(&request_id)),
            reply: None,
        },
        ServerMessage::Error { message } => FrameEffect {
            output: Some(ResponderFormatter::format_error(&message)),
            reply: None,
        },
    }
}

/// Run one responder session until the user quits (`Ok`) or the connection
/// drops (`Err`)
pub async fn run_responder_session(
    url: &str,
    draft: Arc<Mutex<Draft>>,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    tracing::info!("Connected to feedback server at {}", url);

    let (mut write, mut read) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();

    // Single writer: heartbeats and answers share the socket
    let mut write_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let json = match message.encode() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send message: {}", e);
                break;
            }
        }
    });

    let read_draft = draft.clone();
    let reply_tx = outbound_tx.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let effect = apply_server_frame(text.as_str(), &mut *read_draft.lock().await);
                    if let Some(reply) = effect.reply
                        && reply_tx.send(reply).is_err()
                    {
                        break;
                    }
                    if let Some(output) = effect.output {
                        print!("{}", output);
                        redisplay_prompt();
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    let input_loop = handle_input(input_rx, &draft, &outbound_tx);

    tokio::select! {
        _ = &mut read_task => {
            write_task.abort();
            Err(ClientError::ConnectionLost)
        }
        _ = &mut write_task => {
            read_task.abort();
            Err(ClientError::ConnectionLost)
        }
        () = input_loop => {
            read_task.abort();
            write_task.abort();
            Ok(())
        }
    }
}

/// Returns when the user quits or closes the terminal
async fn handle_input(
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    draft: &Mutex<Draft>,
    outbound: &mpsc::UnboundedSender<ClientMessage>,
) {
    while let Some(line) = input_rx.recv().await {
        let output = match Command::parse(&line) {
            Ok(Command::Quit) => return,
            Ok(command) => execute_command(command, draft, outbound).await,
            Err(e) => Some(ResponderFormatter::format_error(&e.to_string())),
        };
        if let Some(output) = output {
            print!("{}", output);
            redisplay_prompt();
        }
    }
}

async fn execute_command(
    command: Command,
    draft: &Mutex<Draft>,
    outbound: &mpsc::UnboundedSender<ClientMessage>,
) -> Option<String> {
    match command {
        Command::Text(line) => {
            draft.lock().await.push_line(line);
            None
        }
        Command::Image(path) => match load_image(&path).await {
            Ok(image) => {
                let summary = format!("attached {} ({} bytes)\n", image.name, image.size);
                draft.lock().await.add_image(image);
                Some(summary)
            }
            Err(e) => Some(ResponderFormatter::format_error(&e.to_string())),
        },
        Command::Send => {
            let mut draft = draft.lock().await;
            let expired = draft.drop_expired();
            let message = draft.take_submission();
            Some(expired_notice(&expired) + &send_or_explain(message, outbound))
        }
        Command::Cancel => {
            let mut draft = draft.lock().await;
            let expired = draft.drop_expired();
            let message = draft.take_cancel();
            Some(expired_notice(&expired) + &send_or_explain(message, outbound))
        }
        Command::AutoAppend(enabled) => {
            draft.lock().await.set_auto_append(enabled);
            Some(format!("auto-append {}\n", if enabled { "on" } else { "off" }))
        }
        Command::Status => Some(ResponderFormatter::format_status(&*draft.lock().await)),
        Command::Help => Some(ResponderFormatter::format_help()),
        Command::Quit => None,
    }
}

fn expired_notice(expired: &[String]) -> String {
    if expired.is_empty() {
        return String::new();
    }
    format!("skipped timed-out request(s): {}\n", expired.join(", "))
}

fn send_or_explain(
    message: Option<ClientMessage>,
    outbound: &mpsc::UnboundedSender<ClientMessage>,
) -> String {
    match message {
        Some(message) => match outbound.send(message) {
            Ok(()) => "sending...\n".to_string(),
            Err(_) => ResponderFormatter::format_error("connection closed"),
        },
        None => ResponderFormatter::format_error("no feedback request is waiting"),
    }
}
