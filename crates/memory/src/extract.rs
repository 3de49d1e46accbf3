//! `MemoryExtractor`: asks the model whether the latest user message
//! reveals a durable fact about the user.
//!
//! Gracefully degrades: gateway failures are logged and reported as
//! "no update" so extraction can never fail or delay the visible answer.

use std::sync::Arc;

use tracing::{debug, warn};

use council_domain::config::MEMORY_NO_UPDATE;
use council_domain::turn::{Segment, Turn};
use council_providers::{GenerateRequest, ModelGateway, NO_RESPONSE_TEXT};

/// Runs the single memory-extraction call for a user turn.
pub struct MemoryExtractor {
    gateway: Arc<dyn ModelGateway>,
    model: String,
    instruction: String,
}

impl MemoryExtractor {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        model: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            model: model.into(),
            instruction: instruction.into(),
        }
    }

    /// Propose at most one new fact from `user_text`.
    ///
    /// * `history`: prior turns; attachments are stripped before sending
    /// * `user_text`: the latest user message; blank text means no call
    pub async fn extract(&self, history: &[Turn], user_text: &str) -> Option<String> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            debug!("memory extraction skipped: no user text");
            return None;
        }

        let mut turns = strip_attachments(history);
        turns.push(Turn::user(user_text));

        let req = GenerateRequest::new(self.model.clone(), turns).with_instruction(self.instruction.clone());

        match self.gateway.generate(&req).await {
            Ok(resp) => {
                let fact = interpret_reply(&resp.text);
                debug!(model = %self.model, proposed = fact.is_some(), "memory extraction finished");
                fact
            }
            Err(e) => {
                warn!(model = %self.model, error = %e, "memory extraction failed; treating as no update");
                None
            }
        }
    }
}

/// Text-only copy of the history, dropping turns left without content.
fn strip_attachments(history: &[Turn]) -> Vec<Turn> {
    history
        .iter()
        .filter_map(|turn| {
            let segments: Vec<Segment> = turn
                .segments
                .iter()
                .filter(|s| s.as_text().is_some_and(|t| !t.trim().is_empty()))
                .cloned()
                .collect();
            (!segments.is_empty()).then(|| Turn {
                role: turn.role,
                segments,
            })
        })
        .collect()
}

/// Map the raw model reply to a proposed fact.
///
/// The fact is kept literally apart from surrounding whitespace. Quotes are
/// only tolerated around the sentinel.
fn interpret_reply(reply: &str) -> Option<String> {
    let fact = reply.trim();
    if fact.is_empty() || fact == NO_RESPONSE_TEXT {
        return None;
    }
    let bare = fact
        .trim_matches(|c: char| c == '"' || c == '`' || c == '\'')
        .trim()
        .trim_end_matches('.');
    if bare == MEMORY_NO_UPDATE {
        return None;
    }
    Some(fact.to_string())
}
