//! Caller-owned session store.
//!
//! Persists everything in `sessions.json` under the configured state path:
//! chat sessions with their history, the user's memory facts and the
//! model/grounding settings. All mutation happens under one write lock and
//! is flushed before returning, so a turn's assistant message and memory
//! fact land together or not at all.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use council_domain::error::{Error, Result};
use council_domain::trace::TraceEvent;
use council_domain::turn::{HistoryTurn, Role, Turn};
use council_memory::MemoryStore;

use crate::title::{derive_title, UNTITLED};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Persisted types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub turns: Vec<HistoryTurn>,
}

/// Listing row for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub turns: usize,
}

/// User choices that outlive a single session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Overrides `gateway.default_model` when set.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub grounding: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    sessions: HashMap<String, ChatSession>,
    #[serde(default)]
    memory: MemoryStore,
    #[serde(default)]
    settings: SessionSettings,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Session store backed by a JSON file.
pub struct SessionStore {
    path: PathBuf,
    title_max_chars: usize,
    state: RwLock<StoreState>,
}

impl SessionStore {
    /// Load or create the store at `state_path/sessions.json`.
    pub fn open(state_path: &Path, title_max_chars: usize) -> Result<Self> {
        std::fs::create_dir_all(state_path).map_err(Error::Io)?;

        let path = state_path.join("sessions.json");
        let state = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(Error::Io)?;
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "sessions.json unreadable; starting empty");
                StoreState::default()
            })
        } else {
            StoreState::default()
        };

        tracing::info!(
            sessions = state.sessions.len(),
            memory_facts = state.memory.len(),
            path = %path.display(),
            "session store loaded"
        );

        Ok(Self {
            path,
            title_max_chars,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Create an empty session and persist it.
    pub fn create(&self) -> Result<ChatSession> {
        let now = Utc::now();
        let session = ChatSession {
            id: uuid::Uuid::new_v4().to_string(),
            title: UNTITLED.to_string(),
            created_at: now,
            updated_at: now,
            turns: Vec::new(),
        };
        self.state
            .write()
            .sessions
            .insert(session.id.clone(), session.clone());
        self.flush()?;
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<ChatSession> {
        self.state.read().sessions.get(id).cloned()
    }

    /// Most recently updated first.
    pub fn list(&self) -> Vec<SessionSummary> {
        let state = self.state.read();
        let mut rows: Vec<SessionSummary> = state
            .sessions
            .values()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                title: s.title.clone(),
                updated_at: s.updated_at,
                turns: s.turns.len(),
            })
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        rows
    }

    /// Remove a session, returning it so the caller can drop its attachments.
    pub fn delete(&self, id: &str) -> Result<Option<ChatSession>> {
        let removed = self.state.write().sessions.remove(id);
        if removed.is_some() {
            self.flush()?;
        }
        Ok(removed)
    }

    /// Commit one finished turn: the user's message, the single assistant
    /// message, and the proposed memory fact (if any) in one update.
    pub fn apply_turn(
        &self,
        session_id: &str,
        user: HistoryTurn,
        assistant: Turn,
        memory_fact: Option<String>,
    ) -> Result<ChatSession> {
        let (session, memory_added) = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let session = state
                .sessions
                .get_mut(session_id)
                .ok_or_else(|| Error::Other(format!("unknown session {session_id}")))?;

            let memory_added = match memory_fact {
                Some(fact) => state.memory.insert(fact),
                None => false,
            };

            let first_user_turn = !session.turns.iter().any(|t| t.role == Role::User);
            if first_user_turn {
                session.title = derive_title(&user, self.title_max_chars);
            }
            session.turns.push(user);
            session.turns.push(HistoryTurn::from(assistant));
            session.updated_at = Utc::now();
            (session.clone(), memory_added)
        };

        self.flush()?;

        TraceEvent::SessionUpdated {
            session_id: session.id.clone(),
            turns: session.turns.len(),
            memory_added,
        }
        .emit();

        Ok(session)
    }

    // ── Memory ───────────────────────────────────────────────────────

    /// Snapshot of the memory facts for a turn.
    pub fn memory(&self) -> MemoryStore {
        self.state.read().memory.clone()
    }

    pub fn add_memory(&self, fact: &str) -> Result<bool> {
        let fact = fact.trim();
        if fact.is_empty() {
            return Ok(false);
        }
        let added = self.state.write().memory.insert(fact);
        if added {
            self.flush()?;
        }
        Ok(added)
    }

    pub fn forget_memory(&self, fact: &str) -> Result<bool> {
        let removed = self.state.write().memory.remove(fact);
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    pub fn clear_memory(&self) -> Result<()> {
        self.state.write().memory.clear();
        self.flush()
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> SessionSettings {
        self.state.read().settings.clone()
    }

    pub fn update_settings(&self, update: impl FnOnce(&mut SessionSettings)) -> Result<SessionSettings> {
        let settings = {
            let mut state = self.state.write();
            update(&mut state.settings);
            state.settings.clone()
        };
        self.flush()?;
        Ok(settings)
    }

    /// Persist the current state to disk.
    pub fn flush(&self) -> Result<()> {
        let state = self.state.read();
        let json = serde_json::to_string_pretty(&*state)
            .map_err(|e| Error::Other(format!("serializing sessions: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(Error::Io)?;
        std::fs::rename(&tmp, &self.path).map_err(Error::Io)?;
        Ok(())
    }
}
