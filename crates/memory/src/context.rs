//! Memory context block injected ahead of the agents' system instruction.

use crate::store::MemoryStore;

const BLOCK_START: &str = "--- START OF USER MEMORY ---";
const BLOCK_END: &str = "--- END OF USER MEMORY ---";
const BLOCK_LEAD: &str = "Here are some facts you remember about the user:";

/// Render the facts as a framed bullet list, or `None` when there are none.
pub fn format_memory_block(store: &MemoryStore) -> Option<String> {
    if store.is_empty() {
        return None;
    }
    let bullets = store
        .facts()
        .iter()
        .map(|f| format!("- {f}"))
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!("{BLOCK_START}\n{BLOCK_LEAD}\n{bullets}\n{BLOCK_END}"))
}

/// Prefix `instruction` with the memory block when the store is non-empty.
pub fn with_memory_context(instruction: &str, store: &MemoryStore) -> String {
    match format_memory_block(store) {
        Some(block) => format!("{block}\n\n{instruction}"),
        None => instruction.to_string(),
    }
}
