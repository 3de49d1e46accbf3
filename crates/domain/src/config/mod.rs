mod gateway;
mod observability;
mod pipeline;
mod sessions;

pub use gateway::*;
pub use observability::*;
pub use pipeline::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub prompts: SystemInstructions,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Resolve the per-turn pipeline config.
    ///
    /// `model` and `grounding` are the session's choices; `None` falls back
    /// to the file defaults.
    pub fn pipeline_config(&self, model: Option<&str>, grounding: Option<bool>) -> PipelineConfig {
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.gateway.default_model)
            .to_string();
        PipelineConfig {
            image_model: self.gateway.is_image_model(&model),
            model,
            agent_fanout: self.pipeline.agent_fanout,
            grounding_enabled: grounding.unwrap_or(self.pipeline.grounding),
            stage_delay: Duration::from_millis(self.pipeline.stage_delay_ms),
            instructions: self.prompts.clone(),
        }
    }

    /// Model used by the memory extraction call.
    pub fn memory_model(&self) -> &str {
        self.pipeline
            .memory_model
            .as_deref()
            .unwrap_or(&self.gateway.default_model)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.gateway.base_url.trim().is_empty() {
            issues.push(ConfigIssue::error("gateway.base_url", "base_url must not be empty"));
        }

        if self.gateway.default_model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                "gateway.default_model",
                "default_model must not be empty",
            ));
        }

        if self.gateway.is_image_model(&self.gateway.default_model) {
            issues.push(ConfigIssue::warning(
                "gateway.default_model",
                "default model is an image model; every turn will bypass the agent pipeline",
            ));
        }

        if !self.gateway.auth.has_source() {
            issues.push(ConfigIssue::warning(
                "gateway.auth",
                "no credential source configured; every turn will fail until one is set",
            ));
        }

        match self.pipeline.agent_fanout {
            0 => issues.push(ConfigIssue::error(
                "pipeline.agent_fanout",
                "agent_fanout must be at least 1",
            )),
            DEFAULT_AGENT_FANOUT => {}
            n => issues.push(ConfigIssue::warning(
                "pipeline.agent_fanout",
                format!("agent_fanout = {n}; prompts are tuned for {DEFAULT_AGENT_FANOUT} agents"),
            )),
        }

        for (field, text) in [
            ("prompts.initial", &self.prompts.initial),
            ("prompts.refinement", &self.prompts.refinement),
            ("prompts.synthesizer", &self.prompts.synthesizer),
            ("prompts.memory", &self.prompts.memory),
        ] {
            if text.trim().is_empty() {
                issues.push(ConfigIssue::error(field, "system instruction must not be empty"));
            }
        }

        if !self.prompts.memory.contains(MEMORY_NO_UPDATE) {
            issues.push(ConfigIssue::warning(
                "prompts.memory",
                format!("memory instruction does not mention the {MEMORY_NO_UPDATE} sentinel"),
            ));
        }

        issues
    }
}
