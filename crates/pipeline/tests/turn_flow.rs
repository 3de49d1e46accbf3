//! End-to-end turn tests against a scripted in-process gateway.
//!
//! The gateway routes on the system instruction (each stage gets a distinct
//! marker instruction) and records every request, so the tests can assert
//! on exactly what each stage sent.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use council_domain::citation::Citation;
use council_domain::config::{PipelineConfig, SystemInstructions};
use council_domain::error::{Error, GatewayErrorKind, Result};
use council_domain::turn::{HistoryTurn, PendingAttachment, Role, Segment, Turn};
use council_memory::MemoryStore;
use council_pipeline::prompts::PEERS_HEADER;
use council_pipeline::{
    run_turn, settle, AttachmentInput, InMemoryAttachments, Pacer, TurnContext, TurnError, TurnInput,
};
use council_providers::{GenerateRequest, GenerateResponse, Modality, ModelGateway};

const INITIAL: &str = "INITIAL-INSTRUCTION";
const REFINE: &str = "REFINE-INSTRUCTION";
const SYNTH: &str = "SYNTH-INSTRUCTION";
const MEMORY: &str = "MEMORY-INSTRUCTION";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Test doubles
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Initial,
    Refine,
    Synth,
    Memory,
    Bypass,
}

fn classify(req: &GenerateRequest) -> Call {
    let sys = req.system_instruction.as_str();
    if sys.is_empty() {
        Call::Bypass
    } else if sys.ends_with(INITIAL) {
        Call::Initial
    } else if sys.ends_with(REFINE) {
        Call::Refine
    } else if sys.ends_with(SYNTH) {
        Call::Synth
    } else if sys.ends_with(MEMORY) {
        Call::Memory
    } else {
        panic!("unexpected instruction: {sys}")
    }
}

/// Text of the last (prompt) turn of a request.
fn last_text(req: &GenerateRequest) -> String {
    req.turns.last().map(Turn::text).unwrap_or_default()
}

/// Pull `draft-N` out of a refinement prompt's own-answer section.
fn own_draft(prompt: &str) -> usize {
    let own = prompt.split(PEERS_HEADER).next().unwrap_or_default();
    let at = own.rfind("draft-").expect("own draft present");
    own[at + 6..at + 7].parse().expect("draft index")
}

struct ScriptedGateway {
    ready: bool,
    memory_reply: Option<String>,
    /// Error body returned by the first initial call.
    fail_initial: Option<&'static str>,
    fail_refine_for: Option<usize>,
    /// Error body returned by the synthesis call.
    fail_synth: Option<&'static str>,
    /// Initial call N sleeps `(fanout - N) * 10ms`, so later agents finish first.
    stagger_initial: bool,
    /// Refinement of agent N sleeps `(fanout - N) * 10ms`, so later agents finish first.
    stagger_refinement: bool,
    synth_citations: Vec<Citation>,
    bypass_parts: Vec<Segment>,
    initial_calls: Mutex<usize>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            ready: true,
            memory_reply: Some("NO_UPDATE".into()),
            fail_initial: None,
            fail_refine_for: None,
            fail_synth: None,
            stagger_initial: false,
            stagger_refinement: false,
            synth_citations: Vec::new(),
            bypass_parts: vec![Segment::text("here is your picture"), Segment::blob("image/png", vec![1, 2, 3])],
            initial_calls: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedGateway {
    fn calls(&self, kind: Call) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| classify(r) == kind)
            .cloned()
            .collect()
    }

    fn total_calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait::async_trait]
impl ModelGateway for ScriptedGateway {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        self.requests.lock().push(req.clone());
        match classify(req) {
            Call::Initial => {
                let n = {
                    let mut count = self.initial_calls.lock();
                    *count += 1;
                    *count - 1
                };
                if let (0, Some(body)) = (n, self.fail_initial) {
                    return Err(Error::gateway(body));
                }
                if self.stagger_initial {
                    tokio::time::sleep(Duration::from_millis((4 - n as u64) * 10)).await;
                }
                Ok(GenerateResponse::text(format!("draft-{n}")))
            }
            Call::Refine => {
                let agent = own_draft(&last_text(req));
                if self.fail_refine_for == Some(agent) {
                    return Err(Error::gateway("HTTP 429: RESOURCE_EXHAUSTED quota exceeded"));
                }
                if self.stagger_refinement {
                    tokio::time::sleep(Duration::from_millis((4 - agent as u64) * 10)).await;
                }
                Ok(GenerateResponse::text(format!("refined-{agent}")))
            }
            Call::Synth => match self.fail_synth {
                Some(body) => Err(Error::gateway(body)),
                None => Ok(GenerateResponse::new(
                    "FINAL",
                    vec![Segment::text("FINAL")],
                    self.synth_citations.clone(),
                )),
            },
            Call::Memory => match &self.memory_reply {
                Some(reply) => Ok(GenerateResponse::text(reply.clone())),
                None => Err(Error::Http("memory backend down".into())),
            },
            Call::Bypass => Ok(GenerateResponse::new(
                "here is your picture",
                self.bypass_parts.clone(),
                Vec::new(),
            )),
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(Error::Config("no API key".into()))
        }
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

#[async_trait::async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, delay: Duration) {
        self.pauses.lock().push(delay);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn pipeline_config(model: &str) -> PipelineConfig {
    let mut cfg = PipelineConfig::new(model);
    cfg.stage_delay = Duration::from_millis(1000);
    cfg.instructions = SystemInstructions {
        initial: INITIAL.into(),
        refinement: REFINE.into(),
        synthesizer: SYNTH.into(),
        memory: MEMORY.into(),
    };
    cfg
}

struct Harness {
    gateway: Arc<ScriptedGateway>,
    pacer: Arc<RecordingPacer>,
    ctx: TurnContext,
}

fn harness(gateway: ScriptedGateway, config: PipelineConfig) -> Harness {
    let gateway = Arc::new(gateway);
    let pacer = Arc::new(RecordingPacer::default());
    let ctx = TurnContext {
        gateway: gateway.clone(),
        resolver: Arc::new(InMemoryAttachments::new()),
        pacer: pacer.clone(),
        pipeline: config,
        memory_model: "text-model".into(),
    };
    Harness { gateway, pacer, ctx }
}

fn text_input(text: &str) -> TurnInput {
    TurnInput {
        user_text: text.into(),
        ..Default::default()
    }
}

fn photo() -> PendingAttachment {
    PendingAttachment {
        name: "leaf.png".into(),
        mime_type: "image/png".into(),
        data: vec![0x89, b'P', b'N', b'G'],
    }
}

fn cite(uri: &str, title: &str) -> Citation {
    Citation {
        uri: uri.into(),
        title: title.into(),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn explain_photosynthesis_runs_all_three_stages() {
    let h = harness(ScriptedGateway::default(), pipeline_config("gemini-2.5-flash"));

    let outcome = run_turn(&h.ctx, text_input("Explain photosynthesis")).await.unwrap();

    assert_eq!(h.gateway.calls(Call::Initial).len(), 4);
    assert_eq!(h.gateway.calls(Call::Refine).len(), 4);
    assert_eq!(h.gateway.calls(Call::Synth).len(), 1);
    assert_eq!(h.gateway.calls(Call::Memory).len(), 1);
    assert_eq!(h.gateway.total_calls(), 10);
    assert!(h.gateway.calls(Call::Initial).iter().all(|r| !r.tools.web_search));

    let synth = last_text(&h.gateway.calls(Call::Synth)[0]);
    for i in 0..4 {
        assert!(synth.contains(&format!("Response {}:\nrefined-{i}", i + 1)));
    }

    assert_eq!(outcome.final_message, Turn::model("FINAL"));
    assert!(outcome.citations.is_empty());
    assert_eq!(outcome.proposed_memory_fact, None);
    assert!(outcome.attachment.is_none());
}

#[tokio::test]
async fn citations_come_from_synthesis_and_are_filtered() {
    let gw = ScriptedGateway {
        synth_citations: vec![
            cite("https://a.example", "A"),
            cite("", "no uri"),
            cite("https://b.example", "B"),
            cite("https://c.example", ""),
            cite("https://a.example", "A again"),
        ],
        ..Default::default()
    };
    let mut cfg = pipeline_config("gemini-2.5-flash");
    cfg.grounding_enabled = true;
    let h = harness(gw, cfg);

    let outcome = run_turn(&h.ctx, text_input("Who won the 2024 Tour de France?")).await.unwrap();
    assert_eq!(
        outcome.citations,
        vec![cite("https://a.example", "A"), cite("https://b.example", "B")]
    );
}

#[tokio::test]
async fn initial_requests_are_identical() {
    let h = harness(ScriptedGateway::default(), pipeline_config("gemini-2.5-flash"));
    let history = vec![HistoryTurn::user("hi"), HistoryTurn::model("hello")];
    let input = TurnInput {
        history,
        user_text: "what is rust?".into(),
        ..Default::default()
    };
    run_turn(&h.ctx, input).await.unwrap();

    let initial = h.gateway.calls(Call::Initial);
    assert_eq!(initial.len(), 4);
    for req in &initial {
        assert_eq!(req.turns, initial[0].turns);
        assert_eq!(req.system_instruction, INITIAL);
        assert_eq!(req.model, "gemini-2.5-flash");
    }
    assert_eq!(
        initial[0].turns,
        vec![Turn::user("hi"), Turn::model("hello"), Turn::user("what is rust?")]
    );
}

#[tokio::test]
async fn refinement_shows_each_agent_only_its_peers() {
    let h = harness(ScriptedGateway::default(), pipeline_config("gemini-2.5-flash"));
    run_turn(&h.ctx, text_input("compare sorting algorithms")).await.unwrap();

    let refine = h.gateway.calls(Call::Refine);
    assert_eq!(refine.len(), 4);
    for req in &refine {
        let prompt = last_text(req);
        let own = own_draft(&prompt);
        let (_, peers) = prompt.split_once(PEERS_HEADER).unwrap();
        assert!(!peers.contains(&format!("draft-{own}")));
        for other in (0..4).filter(|i| *i != own) {
            assert!(peers.contains(&format!("draft-{other}")));
        }
        assert!(prompt.contains("compare sorting algorithms"));
        // The synthetic prompt replaces the current user turn.
        assert_eq!(req.turns.len(), 1);
        assert_eq!(req.turns[0].role, Role::User);
    }
}

#[tokio::test(start_paused = true)]
async fn synthesis_lists_answers_in_agent_order() {
    let gw = ScriptedGateway {
        stagger_refinement: true,
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    run_turn(&h.ctx, text_input("order test")).await.unwrap();

    let synth = h.gateway.calls(Call::Synth);
    assert_eq!(synth.len(), 1);
    let prompt = last_text(&synth[0]);
    let positions: Vec<usize> = (0..4)
        .map(|i| prompt.find(&format!("Response {}:\nrefined-{i}", i + 1)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test(start_paused = true)]
async fn refinement_pairs_each_agent_with_its_own_draft() {
    let gw = ScriptedGateway {
        stagger_initial: true,
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    run_turn(&h.ctx, text_input("order test")).await.unwrap();

    let refine = h.gateway.calls(Call::Refine);
    assert_eq!(refine.len(), 4);
    for req in &refine {
        let prompt = last_text(req);
        let (_, peers) = prompt.split_once(PEERS_HEADER).unwrap();
        // The one agent label missing from the peers list is this agent.
        let agent = (0..4)
            .find(|i| !peers.contains(&format!("Agent {}:", i + 1)))
            .unwrap();
        assert_eq!(own_draft(&prompt), agent);
        for other in (0..4).filter(|i| *i != agent) {
            assert!(peers.contains(&format!("Agent {}:\ndraft-{other}", other + 1)));
        }
    }
}

#[tokio::test]
async fn pacer_pauses_between_stages() {
    let h = harness(ScriptedGateway::default(), pipeline_config("gemini-2.5-flash"));
    run_turn(&h.ctx, text_input("pace me")).await.unwrap();
    assert_eq!(
        *h.pacer.pauses.lock(),
        vec![Duration::from_millis(1000), Duration::from_millis(1000)]
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Grounding and image models
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn grounding_applies_to_every_pipeline_call() {
    let mut cfg = pipeline_config("gemini-2.5-flash");
    cfg.grounding_enabled = true;
    let h = harness(ScriptedGateway::default(), cfg);
    run_turn(&h.ctx, text_input("latest rust release?")).await.unwrap();

    for kind in [Call::Initial, Call::Refine, Call::Synth] {
        assert!(h.gateway.calls(kind).iter().all(|r| r.tools.web_search), "{kind:?}");
    }
    assert!(h.gateway.calls(Call::Memory).iter().all(|r| !r.tools.web_search));
}

#[tokio::test]
async fn image_model_bypasses_with_one_call() {
    let mut cfg = pipeline_config("gemini-2.0-flash-preview-image-generation");
    cfg.image_model = true;
    cfg.grounding_enabled = true;
    let h = harness(ScriptedGateway::default(), cfg);

    let outcome = run_turn(&h.ctx, text_input("draw a cat")).await.unwrap();

    let bypass = h.gateway.calls(Call::Bypass);
    assert_eq!(bypass.len(), 1);
    assert!(!bypass[0].tools.web_search);
    assert_eq!(bypass[0].response_modalities, vec![Modality::Text, Modality::Image]);
    assert_eq!(bypass[0].turns, vec![Turn::user("draw a cat")]);
    assert!(h.gateway.calls(Call::Initial).is_empty());
    assert!(h.pacer.pauses.lock().is_empty());

    assert_eq!(outcome.final_message.role, Role::Model);
    assert_eq!(
        outcome.final_message.segments,
        vec![Segment::text("here is your picture"), Segment::blob("image/png", vec![1, 2, 3])]
    );
    assert!(outcome.citations.is_empty());
    // Memory extraction still runs, on the text model.
    let memory = h.gateway.calls(Call::Memory);
    assert_eq!(memory.len(), 1);
    assert_eq!(memory[0].model, "text-model");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Memory
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn new_fact_is_proposed() {
    let gw = ScriptedGateway {
        memory_reply: Some("The user's name is Sam.".into()),
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    let outcome = run_turn(&h.ctx, text_input("Hi, I'm Sam")).await.unwrap();
    assert_eq!(outcome.proposed_memory_fact.as_deref(), Some("The user's name is Sam."));

    let memory = h.gateway.calls(Call::Memory);
    assert_eq!(memory[0].system_instruction, MEMORY);
    assert_eq!(memory[0].turns.last(), Some(&Turn::user("Hi, I'm Sam")));
}

#[tokio::test]
async fn known_fact_is_not_proposed_again() {
    let gw = ScriptedGateway {
        memory_reply: Some("The user's name is Sam.".into()),
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    let input = TurnInput {
        user_text: "Sam here again".into(),
        memory: ["The user's name is Sam.".to_string()].into_iter().collect(),
        ..Default::default()
    };
    let outcome = run_turn(&h.ctx, input).await.unwrap();
    assert_eq!(outcome.proposed_memory_fact, None);
}

#[tokio::test]
async fn memory_facts_prefix_every_agent_instruction() {
    let h = harness(ScriptedGateway::default(), pipeline_config("gemini-2.5-flash"));
    let memory: MemoryStore = ["Prefers metric units.".to_string()].into_iter().collect();
    let input = TurnInput {
        user_text: "how far is the moon?".into(),
        memory,
        ..Default::default()
    };
    run_turn(&h.ctx, input).await.unwrap();

    for kind in [Call::Initial, Call::Refine, Call::Synth] {
        for req in h.gateway.calls(kind) {
            assert!(req.system_instruction.starts_with("--- START OF USER MEMORY ---"));
            assert!(req.system_instruction.contains("- Prefers metric units."));
        }
    }
    assert_eq!(h.gateway.calls(Call::Memory)[0].system_instruction, MEMORY);
}

#[tokio::test]
async fn attachment_only_turn_skips_memory_extraction() {
    let h = harness(ScriptedGateway::default(), pipeline_config("gemini-2.5-flash"));
    let input = TurnInput {
        user_text: "   ".into(),
        attachment: Some(AttachmentInput::Loaded(photo())),
        ..Default::default()
    };
    let outcome = run_turn(&h.ctx, input).await.unwrap();

    assert!(h.gateway.calls(Call::Memory).is_empty());
    assert_eq!(outcome.attachment, Some(photo()));

    let initial = h.gateway.calls(Call::Initial);
    assert_eq!(
        initial[0].turns.last().unwrap().segments,
        vec![Segment::blob("image/png", vec![0x89, b'P', b'N', b'G'])]
    );
    let synth_prompt = last_text(&h.gateway.calls(Call::Synth)[0]);
    assert!(synth_prompt.contains("[Attached file: leaf.png (image/png)]"));
}

#[tokio::test]
async fn memory_failure_does_not_fail_the_turn() {
    let gw = ScriptedGateway {
        memory_reply: None,
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    let outcome = run_turn(&h.ctx, text_input("I live in Oslo")).await.unwrap();
    assert_eq!(outcome.final_message, Turn::model("FINAL"));
    assert_eq!(outcome.proposed_memory_fact, None);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Failures
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn refinement_quota_error_aborts_before_synthesis() {
    let gw = ScriptedGateway {
        fail_refine_for: Some(2),
        memory_reply: Some("The user likes tea.".into()),
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    let result = run_turn(&h.ctx, text_input("I like tea, what goes with it?")).await;

    let err = result.as_ref().unwrap_err();
    assert!(matches!(
        err,
        TurnError::Gateway {
            kind: GatewayErrorKind::QuotaExceeded,
            ..
        }
    ));
    assert!(h.gateway.calls(Call::Synth).is_empty());

    let message = settle(&result);
    assert_eq!(message.role, Role::Model);
    assert_eq!(
        message.text(),
        "You have exceeded your API quota. Please check your plan and billing details, or try again later."
    );
}

#[tokio::test]
async fn initial_credential_error_skips_refinement_and_synthesis() {
    let gw = ScriptedGateway {
        fail_initial: Some("HTTP 400: API key not valid. Please pass a valid API key."),
        memory_reply: Some("The user likes tea.".into()),
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    let result = run_turn(&h.ctx, text_input("I like tea")).await;

    assert!(matches!(
        result,
        Err(TurnError::Gateway {
            kind: GatewayErrorKind::InvalidCredential,
            ..
        })
    ));
    assert!(h.gateway.calls(Call::Refine).is_empty());
    assert!(h.gateway.calls(Call::Synth).is_empty());
    assert!(h.pacer.pauses.lock().is_empty());

    let message = settle(&result);
    assert_eq!(message.role, Role::Model);
    assert_eq!(
        message.segments,
        vec![Segment::text("Your API key is not valid. Please check it and try again.")]
    );
}

#[tokio::test]
async fn synthesis_failure_returns_the_error_not_a_partial_answer() {
    let gw = ScriptedGateway {
        fail_synth: Some("HTTP 500 - boom"),
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    let result = run_turn(&h.ctx, text_input("Explain photosynthesis")).await;

    assert_eq!(h.gateway.calls(Call::Refine).len(), 4);
    assert_eq!(h.gateway.calls(Call::Synth).len(), 1);
    assert_eq!(
        result.as_ref().unwrap_err(),
        &TurnError::Gateway {
            kind: GatewayErrorKind::Unknown,
            detail: "HTTP 500 - boom".into(),
        }
    );

    let message = settle(&result);
    assert_eq!(message.segments, vec![Segment::text("An error occurred: HTTP 500 - boom")]);
    assert!(!message.text().contains("refined-"));
}

#[tokio::test]
async fn missing_credential_fails_before_any_call() {
    let gw = ScriptedGateway {
        ready: false,
        ..Default::default()
    };
    let h = harness(gw, pipeline_config("gemini-2.5-flash"));
    let result = run_turn(&h.ctx, text_input("hello")).await;
    assert!(matches!(result, Err(TurnError::Config(_))));
    assert_eq!(h.gateway.total_calls(), 0);
    assert_eq!(
        settle(&result).text(),
        "No API key configured. Set one before sending a message."
    );
}

#[tokio::test]
async fn unreadable_attachment_fails_before_any_call() {
    let h = harness(ScriptedGateway::default(), pipeline_config("gemini-2.5-flash"));
    let dir = tempfile::tempdir().unwrap();
    let input = TurnInput {
        user_text: "summarize".into(),
        attachment: Some(AttachmentInput::Path(dir.path().join("missing.pdf"))),
        ..Default::default()
    };
    let result = run_turn(&h.ctx, input).await;
    assert!(matches!(result, Err(TurnError::Attachment(_))));
    assert_eq!(h.gateway.total_calls(), 0);
    assert_eq!(
        settle(&result).text(),
        "Sorry, I couldn't process the attached file. Please try again."
    );
}

#[tokio::test]
async fn empty_submission_is_rejected() {
    let h = harness(ScriptedGateway::default(), pipeline_config("gemini-2.5-flash"));
    let result = run_turn(&h.ctx, text_input("  ")).await;
    assert_eq!(result.unwrap_err(), TurnError::EmptyMessage);
    assert_eq!(h.gateway.total_calls(), 0);
}
