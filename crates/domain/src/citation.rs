use serde::{Deserialize, Serialize};

/// A web source returned by a grounded model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

impl Citation {
    /// Only citations with both a URI and a title are shown to the user.
    pub fn is_valid(&self) -> bool {
        !self.uri.trim().is_empty() && !self.title.trim().is_empty()
    }
}

/// Keep valid citations, dropping later duplicates of the same URI.
pub fn valid_citations(chunks: &[Citation]) -> Vec<Citation> {
    let mut seen = std::collections::HashSet::new();
    chunks
        .iter()
        .filter(|c| c.is_valid())
        .filter(|c| seen.insert(c.uri.clone()))
        .cloned()
        .collect()
}
