//! Shared types used across all modules.
//!
//! Defines the chat message history, the code snapshot produced by the
//! fetcher and the review output. Other modules import from here rather
//! than reaching into each other's internals.

pub mod message;
pub mod review;
pub mod snapshot;

pub use message::{ChatMessage, Role};
pub use review::{ParsedReview, ReviewReport};
pub use snapshot::{CodeSnapshot, SnapshotKey};
