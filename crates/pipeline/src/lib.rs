//! `council-pipeline`: the multi-agent turn orchestrator.
//!
//! One user turn flows through:
//!
//! 1. [`attachment`]: load the pending file into an inline segment
//! 2. [`conversation`]: rebuild the gateway turn list, resolving stored
//!    attachment references lazily
//! 3. [`pipeline`]: initial fan-out, cross-agent refinement, synthesis
//!    (or the single-call bypass for image models)
//! 4. [`turn`]: runs the pipeline and memory extraction as two tasks and
//!    returns both results together

pub mod attachment;
pub mod conversation;
pub mod error;
pub mod pacing;
pub mod pipeline;
pub mod prompts;
pub mod turn;

pub use attachment::AttachmentInput;
pub use conversation::{AttachmentResolver, Conversation, ConversationBuilder, InMemoryAttachments};
pub use error::TurnError;
pub use pacing::{NoPacer, Pacer, TokioPacer};
pub use pipeline::{AgentAnswer, PipelineOutput, PipelineStage, SynthesisPipeline, SynthesisResult};
pub use turn::{run_turn, settle, TurnContext, TurnInput, TurnOutcome};
