use serde::{Deserialize, Serialize};
use std::time::Duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Multi-agent pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Number of agents in the initial and refinement stages.
pub const DEFAULT_AGENT_FANOUT: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    #[serde(default = "d_fanout")]
    pub agent_fanout: usize,
    /// Pause between stages, to stay under the gateway's burst limits.
    #[serde(default = "d_1000")]
    pub stage_delay_ms: u64,
    /// Default web-search grounding preference for new sessions.
    #[serde(default)]
    pub grounding: bool,
    /// Model for memory extraction. Defaults to the gateway default model.
    #[serde(default)]
    pub memory_model: Option<String>,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            agent_fanout: DEFAULT_AGENT_FANOUT,
            stage_delay_ms: 1_000,
            grounding: false,
            memory_model: None,
        }
    }
}

fn d_fanout() -> usize {
    DEFAULT_AGENT_FANOUT
}
fn d_1000() -> u64 {
    1_000
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// System instructions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Literal reply the memory instruction asks for when nothing is worth keeping.
pub const MEMORY_NO_UPDATE: &str = "NO_UPDATE";

const INITIAL_PROMPT: &str = "You are one of several expert assistants answering the same \
user request independently. Give a complete, accurate and well-structured answer. \
Use the conversation history for context.";

const REFINEMENT_PROMPT: &str = "You are an expert assistant reviewing your own answer \
alongside answers from other assistants to the same request. Critically compare them, \
correct any mistakes, incorporate good ideas you missed, and produce an improved answer. \
Reply with the improved answer only.";

const SYNTHESIZER_PROMPT: &str = "You are the final synthesizer. You receive several \
refined answers to the same user request. Combine their strongest parts into the single \
best final answer for the user. Do not critique or mention the individual responses; \
answer the user directly.";

const MEMORY_PROMPT: &str = "You maintain long-term memory about the user. Read the \
latest user message in the context of the conversation. If it reveals a durable, \
personal fact worth remembering (name, preferences, goals, background), reply with \
one concise factual sentence about the user. Otherwise reply with exactly NO_UPDATE.";

/// System instructions for each pipeline call kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInstructions {
    #[serde(default = "d_initial")]
    pub initial: String,
    #[serde(default = "d_refinement")]
    pub refinement: String,
    #[serde(default = "d_synthesizer")]
    pub synthesizer: String,
    #[serde(default = "d_memory")]
    pub memory: String,
}

impl Default for SystemInstructions {
    fn default() -> Self {
        Self {
            initial: d_initial(),
            refinement: d_refinement(),
            synthesizer: d_synthesizer(),
            memory: d_memory(),
        }
    }
}

fn d_initial() -> String {
    INITIAL_PROMPT.into()
}
fn d_refinement() -> String {
    REFINEMENT_PROMPT.into()
}
fn d_synthesizer() -> String {
    SYNTHESIZER_PROMPT.into()
}
fn d_memory() -> String {
    MEMORY_PROMPT.into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolved per-turn config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything one pipeline run needs, resolved from the file config plus
/// the session's model and grounding choices.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model: String,
    pub agent_fanout: usize,
    /// The user's grounding preference. See [`PipelineConfig::grounding_active`].
    pub grounding_enabled: bool,
    pub stage_delay: Duration,
    pub instructions: SystemInstructions,
    /// True when `model` is an image-oriented model.
    pub image_model: bool,
}

impl PipelineConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            agent_fanout: DEFAULT_AGENT_FANOUT,
            grounding_enabled: false,
            stage_delay: Duration::from_secs(1),
            instructions: SystemInstructions::default(),
            image_model: false,
        }
    }

    /// Grounding is never requested on image models, whatever the preference.
    pub fn grounding_active(&self) -> bool {
        self.grounding_enabled && !self.image_model
    }
}
