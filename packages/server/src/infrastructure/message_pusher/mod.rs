//! メッセージ送信（通知）の実装
//!
//! - `websocket`: delivery through the per-session channels drained by the
//!   WebSocket writer tasks

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
