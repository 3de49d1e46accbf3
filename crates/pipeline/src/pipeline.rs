//! The multi-agent synthesis pipeline.
//!
//! ```text
//! Initializing ──(N parallel calls)──▶ pause ──▶ Refining ──(N parallel calls)──▶ pause
//!     ──▶ Synthesizing ──(1 call)──▶ Done
//! ```
//!
//! Image-oriented models take the `Bypassed` path instead: one call with the
//! full conversation, whose parts become the answer verbatim.
//!
//! Each stage is a strict barrier: every call of a stage must succeed
//! before the next stage is built. The first failure aborts the run.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use tracing::Instrument;

use council_domain::citation::{valid_citations, Citation};
use council_domain::config::PipelineConfig;
use council_domain::error::Result;
use council_domain::trace::TraceEvent;
use council_domain::turn::{PendingAttachment, Role, Segment, Turn};
use council_memory::{with_memory_context, MemoryStore};
use council_providers::{GenerateRequest, GenerateResponse, Modality, ModelGateway, NO_RESPONSE_TEXT};

use crate::conversation::Conversation;
use crate::pacing::Pacer;
use crate::prompts;

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Initializing,
    Refining,
    Synthesizing,
    Done,
    Bypassed,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Initializing => "initial",
            PipelineStage::Refining => "refinement",
            PipelineStage::Synthesizing => "synthesis",
            PipelineStage::Done => "done",
            PipelineStage::Bypassed => "bypass",
        }
    }
}

/// One agent's output for a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAnswer {
    pub agent: usize,
    pub text: String,
}

/// The synthesized answer and its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    pub final_text: String,
    /// From the synthesis call only; earlier stages' sources are dropped.
    pub citations: Vec<Citation>,
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutput {
    Synthesized(SynthesisResult),
    /// Raw parts from the single bypass call.
    Bypassed { parts: Vec<Segment> },
}

impl PipelineOutput {
    /// The model-role message shown to the user, and its citations.
    pub fn into_message(self) -> (Turn, Vec<Citation>) {
        match self {
            PipelineOutput::Synthesized(result) => (Turn::model(result.final_text), result.citations),
            PipelineOutput::Bypassed { parts } => (
                Turn {
                    role: Role::Model,
                    segments: parts,
                },
                Vec::new(),
            ),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Fan-out / refine / synthesize over a [`ModelGateway`].
#[derive(Clone)]
pub struct SynthesisPipeline {
    gateway: Arc<dyn ModelGateway>,
    pacer: Arc<dyn Pacer>,
    config: PipelineConfig,
}

impl SynthesisPipeline {
    pub fn new(gateway: Arc<dyn ModelGateway>, pacer: Arc<dyn Pacer>, config: PipelineConfig) -> Self {
        Self {
            gateway,
            pacer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline for one user turn.
    ///
    /// - `conversation`: builder output for this turn
    /// - `memory`: facts prepended to every agent instruction
    /// - `user_text`, `attachment`: restated as context in later stages
    pub async fn run(
        &self,
        conversation: &Conversation,
        memory: &MemoryStore,
        user_text: &str,
        attachment: Option<&PendingAttachment>,
    ) -> Result<PipelineOutput> {
        if self.config.image_model {
            return self.bypass(conversation).await;
        }

        let fanout = self.config.agent_fanout.max(1);
        let context = prompts::request_context(user_text, attachment);

        // ── Stage 1: independent initial answers ─────────────────────
        tracing::debug!(stage = PipelineStage::Initializing.as_str(), fanout, "pipeline stage");
        let instruction = with_memory_context(&self.config.instructions.initial, memory);
        let request = self.request(conversation.turns(), instruction);
        let initial = self
            .fan_out(PipelineStage::Initializing, (0..fanout).map(|_| request.clone()).collect())
            .await?;

        self.pacer.pause(self.config.stage_delay).await;

        // ── Stage 2: each agent refines against the others ──────────
        tracing::debug!(stage = PipelineStage::Refining.as_str(), fanout, "pipeline stage");
        let initial_texts: Vec<String> = initial.into_iter().map(|a| a.text).collect();
        let instruction = with_memory_context(&self.config.instructions.refinement, memory);
        let requests = (0..fanout)
            .map(|agent| {
                let prompt = prompts::refinement_prompt(&context, agent, &initial_texts);
                self.request(conversation.history_with(prompt), instruction.clone())
            })
            .collect();
        let refined = self.fan_out(PipelineStage::Refining, requests).await?;

        self.pacer.pause(self.config.stage_delay).await;

        // ── Stage 3: one synthesis call ─────────────────────────────
        tracing::debug!(stage = PipelineStage::Synthesizing.as_str(), "pipeline stage");
        let refined_texts: Vec<String> = refined.into_iter().map(|a| a.text).collect();
        let instruction = with_memory_context(&self.config.instructions.synthesizer, memory);
        let prompt = prompts::synthesis_prompt(&context, &refined_texts);
        let started = Instant::now();
        let response = self
            .call(PipelineStage::Synthesizing, None, self.request(conversation.history_with(prompt), instruction))
            .await?;
        stage_completed(PipelineStage::Synthesizing, 1, started);

        tracing::debug!(stage = PipelineStage::Done.as_str(), "pipeline stage");
        Ok(PipelineOutput::Synthesized(SynthesisResult {
            final_text: response.text,
            citations: valid_citations(&response.grounding_chunks),
        }))
    }

    /// Single call with the whole conversation; text and image output.
    async fn bypass(&self, conversation: &Conversation) -> Result<PipelineOutput> {
        tracing::debug!(stage = PipelineStage::Bypassed.as_str(), model = %self.config.model, "pipeline bypassed");
        let request = GenerateRequest::new(self.config.model.clone(), conversation.turns())
            .with_modalities(&[Modality::Text, Modality::Image]);
        let response = self.call(PipelineStage::Bypassed, None, request).await?;

        let parts = if response.parts.is_empty() {
            vec![Segment::text(NO_RESPONSE_TEXT)]
        } else {
            response.parts
        };
        TraceEvent::PipelineBypassed {
            model: self.config.model.clone(),
            parts: parts.len(),
        }
        .emit();
        Ok(PipelineOutput::Bypassed { parts })
    }

    fn request(&self, turns: Vec<Turn>, instruction: String) -> GenerateRequest {
        GenerateRequest::new(self.config.model.clone(), turns)
            .with_instruction(instruction)
            .with_web_search(self.config.grounding_active())
    }

    /// Issue one call per request concurrently; answers keep request order.
    async fn fan_out(&self, stage: PipelineStage, requests: Vec<GenerateRequest>) -> Result<Vec<AgentAnswer>> {
        let started = Instant::now();
        let calls = requests
            .into_iter()
            .enumerate()
            .map(|(agent, req)| async move {
                let resp = self.call(stage, Some(agent), req).await?;
                Ok::<_, council_domain::error::Error>(AgentAnswer {
                    agent,
                    text: resp.text,
                })
            });
        let answers = try_join_all(calls).await?;
        stage_completed(stage, answers.len(), started);
        Ok(answers)
    }

    async fn call(
        &self,
        stage: PipelineStage,
        agent: Option<usize>,
        req: GenerateRequest,
    ) -> Result<GenerateResponse> {
        let span = tracing::debug_span!("gateway_call", stage = stage.as_str(), agent = ?agent);
        let started = Instant::now();
        let result = self.gateway.generate(&req).instrument(span).await;

        TraceEvent::GatewayCall {
            provider: self.gateway.provider_id().to_string(),
            model: req.model.clone(),
            stage: stage.as_str().to_string(),
            agent,
            grounded: req.tools.web_search,
            duration_ms: started.elapsed().as_millis() as u64,
            ok: result.is_ok(),
        }
        .emit();

        if let Err(e) = &result {
            tracing::warn!(stage = stage.as_str(), agent = ?agent, error = %e, "gateway call failed");
        }
        result
    }
}

fn stage_completed(stage: PipelineStage, answers: usize, started: Instant) {
    TraceEvent::StageCompleted {
        stage: stage.as_str().to_string(),
        answers,
        duration_ms: started.elapsed().as_millis() as u64,
    }
    .emit();
}
