//! `council-domain`: shared types for the Council workspace.
//!
//! Conversation turns and segments, grounding citations, the TOML
//! configuration tree, the shared error enum and structured trace events.

pub mod citation;
pub mod config;
pub mod error;
pub mod trace;
pub mod turn;
