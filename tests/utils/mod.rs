// Shared helpers for the match-flow integration tests.

mod outbox;
mod setup;

pub use outbox::RecordingOutbox;
pub use setup::{cards, ids, TestRoom, CODE};
