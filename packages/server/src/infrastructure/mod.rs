//! Infrastructure layer: wire DTOs and in-memory implementations of the
//! domain interfaces.

pub mod dto;
pub mod message_pusher;
pub mod repository;
