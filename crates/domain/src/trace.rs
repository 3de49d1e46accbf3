use serde::Serialize;

/// Structured trace events emitted across all Council crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    GatewayCall {
        provider: String,
        model: String,
        stage: String,
        agent: Option<usize>,
        grounded: bool,
        duration_ms: u64,
        ok: bool,
    },
    StageCompleted {
        stage: String,
        answers: usize,
        duration_ms: u64,
    },
    PipelineBypassed {
        model: String,
        parts: usize,
    },
    MemoryExtracted {
        proposed: bool,
        duplicate: bool,
    },
    AttachmentUnresolved {
        handle: String,
        reason: String,
    },
    TurnCompleted {
        ok: bool,
        citations: usize,
        duration_ms: u64,
    },
    SessionUpdated {
        session_id: String,
        turns: usize,
        memory_added: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "council_event");
    }
}
