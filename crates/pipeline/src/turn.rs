//! One user turn: the synthesis pipeline and memory extraction run side by
//! side and are joined before anything is returned.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use council_domain::citation::Citation;
use council_domain::config::PipelineConfig;
use council_domain::error::GatewayErrorKind;
use council_domain::trace::TraceEvent;
use council_domain::turn::{HistoryTurn, PendingAttachment, Turn};
use council_memory::{MemoryExtractor, MemoryStore};
use council_providers::ModelGateway;

use crate::attachment::AttachmentInput;
use crate::conversation::{AttachmentResolver, ConversationBuilder};
use crate::error::TurnError;
use crate::pacing::Pacer;
use crate::pipeline::SynthesisPipeline;

/// Long-lived collaborators shared by every turn.
#[derive(Clone)]
pub struct TurnContext {
    pub gateway: Arc<dyn ModelGateway>,
    pub resolver: Arc<dyn AttachmentResolver>,
    pub pacer: Arc<dyn Pacer>,
    pub pipeline: PipelineConfig,
    /// Text model used for memory extraction.
    pub memory_model: String,
}

/// A snapshot of caller state plus the message being sent.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    pub history: Vec<HistoryTurn>,
    pub user_text: String,
    pub attachment: Option<AttachmentInput>,
    pub memory: MemoryStore,
}

/// Everything the caller needs to commit a successful turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub final_message: Turn,
    pub citations: Vec<Citation>,
    /// A fact not already in the memory snapshot, if extraction found one.
    pub proposed_memory_fact: Option<String>,
    /// The loaded attachment, so the caller can store it by reference.
    pub attachment: Option<PendingAttachment>,
}

/// Run one turn end to end.
///
/// Fails before any gateway call when the credential is missing, the
/// attachment cannot be loaded, or the message is empty. Otherwise the
/// pipeline and memory extraction are spawned together; a memory failure
/// only loses the fact, a pipeline failure loses the whole turn.
pub async fn run_turn(ctx: &TurnContext, input: TurnInput) -> Result<TurnOutcome, TurnError> {
    let span = tracing::info_span!(
        "turn",
        model = %ctx.pipeline.model,
        history = input.history.len(),
        attachment = input.attachment.is_some(),
    );
    let started = Instant::now();
    let result = execute(ctx, input).instrument(span).await;

    TraceEvent::TurnCompleted {
        ok: result.is_ok(),
        citations: result.as_ref().map(|o| o.citations.len()).unwrap_or(0),
        duration_ms: started.elapsed().as_millis() as u64,
    }
    .emit();
    result
}

async fn execute(ctx: &TurnContext, input: TurnInput) -> Result<TurnOutcome, TurnError> {
    ctx.gateway.ensure_ready().map_err(TurnError::from_gateway)?;

    let TurnInput {
        history,
        user_text,
        attachment,
        memory,
    } = input;

    let attachment = match attachment {
        Some(input) => Some(input.load().await.map_err(|e| {
            tracing::warn!(error = %e, "attachment could not be loaded");
            TurnError::Attachment(e.to_string())
        })?),
        None => None,
    };

    if user_text.trim().is_empty() && attachment.is_none() {
        return Err(TurnError::EmptyMessage);
    }

    let conversation = ConversationBuilder::new(ctx.resolver.as_ref())
        .build(&history, &user_text, attachment.as_ref())
        .await;

    let extractor = MemoryExtractor::new(
        ctx.gateway.clone(),
        ctx.memory_model.clone(),
        ctx.pipeline.instructions.memory.clone(),
    );
    let memory_task = {
        let prior = conversation.history.clone();
        let user_text = user_text.clone();
        tokio::spawn(
            async move { extractor.extract(&prior, &user_text).await }.in_current_span(),
        )
    };

    let pipeline = SynthesisPipeline::new(ctx.gateway.clone(), ctx.pacer.clone(), ctx.pipeline.clone());
    let pipeline_task = {
        let memory = memory.clone();
        let attachment = attachment.clone();
        tokio::spawn(
            async move {
                pipeline
                    .run(&conversation, &memory, &user_text, attachment.as_ref())
                    .await
            }
            .in_current_span(),
        )
    };

    let (memory_result, pipeline_result) = tokio::join!(memory_task, pipeline_task);

    let extracted = memory_result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "memory task did not complete");
        None
    });
    let output = match pipeline_result {
        Ok(output) => output.map_err(TurnError::from_gateway)?,
        Err(e) => {
            return Err(TurnError::Gateway {
                kind: GatewayErrorKind::Unknown,
                detail: format!("pipeline task did not complete: {e}"),
            })
        }
    };

    let duplicate = extracted.as_ref().is_some_and(|f| memory.contains(f));
    let proposed_memory_fact = extracted.and_then(|f| memory.propose(f));
    TraceEvent::MemoryExtracted {
        proposed: proposed_memory_fact.is_some(),
        duplicate,
    }
    .emit();

    let (final_message, citations) = output.into_message();
    Ok(TurnOutcome {
        final_message,
        citations,
        proposed_memory_fact,
        attachment,
    })
}

/// The single model-role message to append for a finished turn, whether it
/// succeeded or failed.
pub fn settle(result: &Result<TurnOutcome, TurnError>) -> Turn {
    match result {
        Ok(outcome) => outcome.final_message.clone(),
        Err(e) => Turn::model(e.user_message()),
    }
}
