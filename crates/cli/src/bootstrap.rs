//! Shared boot path and turn submission for `ask` and `chat`.
//!
//! [`App`] wires the Gemini gateway, the session store and the attachment
//! directory together. [`App::submit`] is the caller side of a turn: it
//! snapshots the session, runs the pipeline, and commits the user message,
//! the assistant message and any memory fact in one store update.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use council_domain::config::{Config, ConfigSeverity};
use council_domain::turn::{HistoryTurn, Role, Segment, Turn};
use council_pipeline::attachment::load_file;
use council_pipeline::{
    run_turn, settle, AttachmentInput, Pacer, TokioPacer, TurnContext, TurnError, TurnInput, TurnOutcome,
};
use council_providers::{GeminiGateway, ModelGateway};
use council_sessions::{ChatSession, FileAttachmentResolver, SessionStore};

pub struct App {
    pub config: Arc<Config>,
    pub gateway: Arc<dyn ModelGateway>,
    pub sessions: Arc<SessionStore>,
    pub attachments: Arc<FileAttachmentResolver>,
    pub pacer: Arc<dyn Pacer>,
}

/// Per-message overrides from flags or REPL commands.
#[derive(Debug, Clone, Default)]
pub struct TurnOptions {
    pub model: Option<String>,
    pub grounding: Option<bool>,
    pub attachment: Option<PathBuf>,
}

/// A committed turn.
#[derive(Debug)]
pub struct Submitted {
    pub result: Result<TurnOutcome, TurnError>,
    /// The model message appended to the session (answer or error text).
    pub message: Turn,
    pub session: ChatSession,
}

impl App {
    /// Validate config and open the gateway and stores.
    pub fn build(config: Arc<Config>) -> anyhow::Result<Self> {
        let issues = config.validate();
        for issue in &issues {
            match issue.severity {
                ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
                ConfigSeverity::Error => tracing::error!("config: {issue}"),
            }
        }
        let errors = issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count();
        if errors > 0 {
            anyhow::bail!("config validation failed with {errors} error(s)");
        }

        let gateway = GeminiGateway::from_config(&config.gateway).context("initializing gateway")?;
        let state_path = &config.sessions.state_path;
        let sessions = SessionStore::open(state_path, config.sessions.title_max_chars)
            .with_context(|| format!("opening session store in {}", state_path.display()))?;
        let attachments = FileAttachmentResolver::new(state_path).context("opening attachment store")?;

        Ok(Self {
            config,
            gateway: Arc::new(gateway),
            sessions: Arc::new(sessions),
            attachments: Arc::new(attachments),
            pacer: Arc::new(TokioPacer),
        })
    }

    /// The given session, or a new one when `id` is `None`.
    pub fn open_session(&self, id: Option<&str>) -> anyhow::Result<ChatSession> {
        match id {
            Some(id) => self
                .sessions
                .get(id)
                .with_context(|| format!("no session with id {id}")),
            None => Ok(self.sessions.create()?),
        }
    }

    /// Effective model: flag, then saved setting, then config default.
    pub fn model(&self, opts: &TurnOptions) -> String {
        let settings = self.sessions.settings();
        let requested = opts.model.clone().or(settings.model);
        self.config
            .pipeline_config(requested.as_deref(), None)
            .model
    }

    fn context(&self, opts: &TurnOptions) -> TurnContext {
        let settings = self.sessions.settings();
        let model = opts.model.clone().or(settings.model);
        let grounding = opts.grounding.or(settings.grounding);
        TurnContext {
            gateway: self.gateway.clone(),
            resolver: self.attachments.clone(),
            pacer: self.pacer.clone(),
            pipeline: self.config.pipeline_config(model.as_deref(), grounding),
            memory_model: self.config.memory_model().to_string(),
        }
    }

    /// Run one turn against `session_id` and commit it.
    ///
    /// An empty submission is rejected without touching the session.
    pub async fn submit(&self, session_id: &str, text: &str, opts: &TurnOptions) -> anyhow::Result<Submitted> {
        let session = self
            .sessions
            .get(session_id)
            .with_context(|| format!("no session with id {session_id}"))?;

        // Load once here so the file can be stored by reference even when the
        // turn later fails. A load error is left for the turn to report.
        let attachment = match &opts.attachment {
            Some(path) => Some(match load_file(path).await {
                Ok(loaded) => AttachmentInput::Loaded(loaded),
                Err(_) => AttachmentInput::Path(path.clone()),
            }),
            None => None,
        };

        let mut user_turn = HistoryTurn {
            role: Role::User,
            segments: Vec::new(),
            attachment: None,
        };
        if !text.trim().is_empty() {
            user_turn.segments.push(Segment::text(text));
        }
        if let Some(AttachmentInput::Loaded(att)) = &attachment {
            let stored = self.attachments.store(att).await.context("storing attachment")?;
            user_turn.attachment = Some(stored);
        }

        let input = TurnInput {
            history: session.turns,
            user_text: text.to_string(),
            attachment,
            memory: self.sessions.memory(),
        };
        let result = run_turn(&self.context(opts), input).await;

        if let Err(TurnError::EmptyMessage) = &result {
            anyhow::bail!(TurnError::EmptyMessage.user_message());
        }

        let message = settle(&result);
        let fact = result.as_ref().ok().and_then(|o| o.proposed_memory_fact.clone());
        let stored = user_turn.attachment.clone();
        let session = match self.sessions.apply_turn(session_id, user_turn, message.clone(), fact) {
            Ok(session) => session,
            Err(e) => {
                // Nothing references the stored file now.
                if let Some(att) = stored {
                    if let Err(e) = self.attachments.remove(&att.handle) {
                        tracing::warn!(handle = %att.handle, error = %e, "attachment cleanup failed");
                    }
                }
                return Err(anyhow::Error::new(e).context("saving turn"));
            }
        };

        Ok(Submitted {
            result,
            message,
            session,
        })
    }

    /// Delete a session and the attachment files its history references.
    pub fn delete_session(&self, id: &str) -> anyhow::Result<bool> {
        let Some(session) = self.sessions.delete(id)? else {
            return Ok(false);
        };
        for att in session.turns.iter().filter_map(|t| t.attachment.as_ref()) {
            if let Err(e) = self.attachments.remove(&att.handle) {
                tracing::warn!(handle = %att.handle, error = %e, "attachment cleanup failed");
            }
        }
        Ok(true)
    }
}
