//! Core of the document-QA chat client.
//!
//! Holds the domain model (sessions, messages, client state), the cache and
//! remote API ports, and the [`session::SessionManager`] that keeps them
//! consistent. Adapters for concrete storage and HTTP live in the
//! infrastructure and interaction crates.

pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod remote;
pub mod session;
pub mod state;
pub mod web_search;

pub use error::DocChatError;
