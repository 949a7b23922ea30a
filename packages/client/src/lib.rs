//! Caller side of the feedback collector.
//!
//! [`coordinator::RequestCoordinator`] dispatches a feedback request through a
//! [`gateway::FeedbackGateway`], polls until it settles and renders the answer
//! as [`content::ContentItem`]s. [`responder`] is a terminal stand-in for the
//! browser page that answers requests.

pub mod content;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod i18n;
pub mod responder;
