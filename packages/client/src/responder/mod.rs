//! Terminal responder: answers feedback requests from a terminal instead of
//! a browser.

pub mod attachment;
pub mod command;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use runner::{run_responder, websocket_url};
