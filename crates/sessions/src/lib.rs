//! Session persistence for Council.
//!
//! The pipeline core never touches disk. This crate owns everything the
//! caller persists between turns: chat sessions with their history, the
//! user's memory facts, the model/grounding settings, and attachment files
//! referenced from history.

pub mod attachments;
pub mod store;
pub mod title;

pub use attachments::FileAttachmentResolver;
pub use store::{ChatSession, SessionSettings, SessionStore, SessionSummary};
pub use title::derive_title;
