//! Conversation builder: persisted history + pending input → gateway turns.
//!
//! Persisted user turns keep attachments by reference. References are
//! resolved here, at call time, so every request carries full multimodal
//! context without storing encoded payloads in the history. A reference
//! that no longer resolves only costs that turn its attachment.

use std::collections::HashMap;

use futures_util::future::join_all;
use tracing::{debug, warn};

use council_domain::error::{Error, Result};
use council_domain::trace::TraceEvent;
use council_domain::turn::{AttachmentRef, HistoryTurn, PendingAttachment, Role, Segment, Turn};

/// Resolves a stored attachment reference to its bytes.
#[async_trait::async_trait]
pub trait AttachmentResolver: Send + Sync {
    async fn resolve(&self, attachment: &AttachmentRef) -> Result<Vec<u8>>;
}

/// Resolver backed by a map of handle → bytes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAttachments {
    blobs: HashMap<String, Vec<u8>>,
}

impl InMemoryAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: impl Into<String>, data: Vec<u8>) {
        self.blobs.insert(handle.into(), data);
    }
}

#[async_trait::async_trait]
impl AttachmentResolver for InMemoryAttachments {
    async fn resolve(&self, attachment: &AttachmentRef) -> Result<Vec<u8>> {
        self.blobs
            .get(&attachment.handle)
            .cloned()
            .ok_or_else(|| Error::Attachment(format!("unknown attachment handle {}", attachment.handle)))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Gateway-ready turns for one user submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    /// Prior turns with attachments materialized.
    pub history: Vec<Turn>,
    /// The synthetic turn for the message being submitted.
    pub current: Turn,
}

impl Conversation {
    /// History followed by the current turn.
    pub fn turns(&self) -> Vec<Turn> {
        let mut turns = self.history.clone();
        turns.push(self.current.clone());
        turns
    }

    /// History followed by one extra user turn (used by refinement and
    /// synthesis, which replace the current turn with their own prompt).
    pub fn history_with(&self, prompt: impl Into<String>) -> Vec<Turn> {
        let mut turns = self.history.clone();
        turns.push(Turn::user(prompt));
        turns
    }
}

/// Builds [`Conversation`]s. Pure apart from attachment resolution.
pub struct ConversationBuilder<'a> {
    resolver: &'a dyn AttachmentResolver,
}

impl<'a> ConversationBuilder<'a> {
    pub fn new(resolver: &'a dyn AttachmentResolver) -> Self {
        Self { resolver }
    }

    /// Build the turn list.
    ///
    /// - `history`: persisted turns, oldest first
    /// - `user_text`: the message being sent (may be empty)
    /// - `attachment`: the file sent with it, if any
    pub async fn build(
        &self,
        history: &[HistoryTurn],
        user_text: &str,
        attachment: Option<&PendingAttachment>,
    ) -> Conversation {
        let materialized = join_all(history.iter().map(|turn| self.materialize(turn))).await;
        let history = materialized.into_iter().flatten().collect();

        let mut segments = Vec::new();
        if let Some(att) = attachment {
            segments.push(att.segment());
        }
        if !user_text.trim().is_empty() {
            segments.push(Segment::text(user_text));
        }

        Conversation {
            history,
            current: Turn {
                role: Role::User,
                segments,
            },
        }
    }

    async fn materialize(&self, turn: &HistoryTurn) -> Option<Turn> {
        let mut segments = Vec::with_capacity(turn.segments.len() + 1);

        if let (Role::User, Some(att)) = (turn.role, &turn.attachment) {
            match self.resolver.resolve(att).await {
                Ok(data) => segments.push(Segment::blob(att.mime_type.clone(), data)),
                Err(e) => {
                    warn!(handle = %att.handle, name = %att.name, error = %e, "attachment unresolved; sending turn without it");
                    TraceEvent::AttachmentUnresolved {
                        handle: att.handle.clone(),
                        reason: e.to_string(),
                    }
                    .emit();
                }
            }
        }

        segments.extend(turn.segments.iter().cloned());

        if segments.is_empty() {
            debug!(role = ?turn.role, "dropping history turn with no content");
            return None;
        }
        Some(Turn {
            role: turn.role,
            segments,
        })
    }
}
