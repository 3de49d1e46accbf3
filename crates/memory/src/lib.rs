//! `council-memory`: durable facts about the user.
//!
//! - [`MemoryStore`] holds the caller-owned fact set (exact-match dedup).
//! - [`context`] renders the facts as a framed block prepended to the
//!   agents' system instruction.
//! - [`MemoryExtractor`] runs the single extraction call that proposes at
//!   most one new fact per user turn. It never fails: errors degrade to
//!   "no update".

pub mod context;
pub mod extract;
pub mod store;

pub use context::{format_memory_block, with_memory_context};
pub use extract::MemoryExtractor;
pub use store::MemoryStore;
