//! Utilities shared by the feedback collector server and client.

pub mod logger;
pub mod time;
