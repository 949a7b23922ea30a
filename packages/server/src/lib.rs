//! Feedback collector server: fans feedback requests out to browser sessions
//! over WebSocket and keeps the first terminal answer for polling callers.

pub mod app;
pub mod background;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use app::Application;
pub use config::ServerConfig;
