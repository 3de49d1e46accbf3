use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model gateway
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Identifier used in logs and trace events.
    #[serde(default = "d_gateway_id")]
    pub id: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Model used when the session has not selected one.
    #[serde(default = "d_default_model")]
    pub default_model: String,
    /// Models that produce images. Turns on these models skip the
    /// multi-agent pipeline and never request grounding.
    #[serde(default = "d_image_models")]
    pub image_models: Vec<String>,
    #[serde(default = "d_120000")]
    pub timeout_ms: u64,
    /// Retries for transient failures (quota, 5xx, timeouts).
    #[serde(default = "d_2")]
    pub max_retries: u32,
    /// Base backoff; doubled on each retry.
    #[serde(default = "d_500")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            id: d_gateway_id(),
            base_url: d_base_url(),
            default_model: d_default_model(),
            image_models: d_image_models(),
            timeout_ms: 120_000,
            max_retries: 2,
            retry_backoff_ms: 500,
            auth: AuthConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn is_image_model(&self, model: &str) -> bool {
        self.image_models.iter().any(|m| m == model)
    }
}

/// Where to find the API credential.
///
/// Resolution order: `key`, keychain (`service` + `account`), `env`,
/// then the `{SERVICE}_{ACCOUNT}` environment fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Env var containing the key.
    #[serde(default = "d_auth_env")]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env or keychain).
    #[serde(default)]
    pub key: Option<String>,
    /// Keychain service name (e.g. "council").
    #[serde(default)]
    pub service: Option<String>,
    /// Keychain account name (e.g. "gemini-api-key").
    #[serde(default)]
    pub account: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            env: d_auth_env(),
            key: None,
            service: None,
            account: None,
        }
    }
}

impl AuthConfig {
    /// True when at least one credential source is configured.
    pub fn has_source(&self) -> bool {
        self.key.is_some()
            || self.env.is_some()
            || (self.service.is_some() && self.account.is_some())
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_gateway_id() -> String {
    "gemini".into()
}
fn d_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn d_default_model() -> String {
    "gemini-2.5-flash".into()
}
fn d_image_models() -> Vec<String> {
    vec!["gemini-2.0-flash-preview-image-generation".into()]
}
fn d_auth_env() -> Option<String> {
    Some("GEMINI_API_KEY".into())
}
fn d_120000() -> u64 {
    120_000
}
fn d_2() -> u32 {
    2
}
fn d_500() -> u64 {
    500
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
