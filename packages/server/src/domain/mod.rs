//! Domain layer: value objects, entities, and the interfaces the use cases
//! depend on (registry, store, pusher).

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    Connection, FeedbackOutcome, FeedbackRequest, FeedbackStatus, FeedbackSubmission,
    ImageAttachment,
};
pub use error::{DomainError, MessagePushError, RepositoryError, ValueObjectError};
pub use pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use pusher::MockMessagePusher;
pub use repository::{ConnectionRegistry, FeedbackRepository};
pub use value_object::{ConnectionId, Language, RequestId, Timestamp};
