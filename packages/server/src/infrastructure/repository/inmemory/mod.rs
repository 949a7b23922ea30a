//! In-memory implementations backed by mutex-guarded `HashMap`s.

mod connection;
mod feedback;

pub use connection::InMemoryConnectionRegistry;
pub use feedback::InMemoryFeedbackRepository;
