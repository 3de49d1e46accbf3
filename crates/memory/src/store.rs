use serde::{Deserialize, Serialize};

/// Insertion-ordered set of memory facts.
///
/// Deduplication is literal: two facts are the same only when their
/// strings are byte-equal. No trimming or case folding happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    facts: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, fact: &str) -> bool {
        self.facts.iter().any(|f| f == fact)
    }

    /// Return the fact back if it would be new to the store.
    pub fn propose(&self, fact: String) -> Option<String> {
        if self.contains(&fact) {
            None
        } else {
            Some(fact)
        }
    }

    /// Add a fact. Returns `false` when it was already present.
    pub fn insert(&mut self, fact: impl Into<String>) -> bool {
        let fact = fact.into();
        if self.contains(&fact) {
            return false;
        }
        self.facts.push(fact);
        true
    }

    /// Remove a fact. Returns `false` when it was not present.
    pub fn remove(&mut self, fact: &str) -> bool {
        let before = self.facts.len();
        self.facts.retain(|f| f != fact);
        self.facts.len() != before
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl FromIterator<String> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut store = MemoryStore::new();
        for fact in iter {
            store.insert(fact);
        }
        store
    }
}
