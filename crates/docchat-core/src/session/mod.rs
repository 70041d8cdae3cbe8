//! Chat sessions: summaries, messages, and the lifecycle controller.

pub mod manager;
pub mod merge;
pub mod message;
pub mod model;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod test_support;

pub use manager::{CLEAR_FAILED_ALERT, DELETE_FAILED_ALERT, ERROR_REPLY, SessionManager};
pub use merge::{has_content_sessions, merge_sessions};
pub use message::{Message, MessageMetadata, QaRecord, Sender};
pub use model::{PLACEHOLDER_QUESTION, Session};
pub use reconcile::{expand_records, reconcile, reconcile_at};
