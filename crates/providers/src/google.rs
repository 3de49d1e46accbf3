//! Google Gemini adapter.
//!
//! Implements the Gemini `generateContent` API, including web-search
//! grounding (`google_search` tool) and image output modalities.
//! Auth is via an API key passed as a query parameter (`key={api_key}`).

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use council_domain::citation::Citation;
use council_domain::config::GatewayConfig;
use council_domain::error::{Error, GatewayErrorKind, Result};
use council_domain::turn::{Role, Segment, Turn};

use crate::traits::{GenerateRequest, GenerateResponse, Modality, ModelGateway};
use crate::util::{from_reqwest, redact_url_key, resolve_api_key};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A [`ModelGateway`] backed by the Google Gemini API.
pub struct GeminiGateway {
    id: String,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    retry_backoff: Duration,
    client: reqwest::Client,
}

impl GeminiGateway {
    /// Create a gateway from the deserialized config.
    ///
    /// A missing credential does not fail here; [`ModelGateway::ensure_ready`]
    /// reports it when a turn is attempted.
    pub fn from_config(cfg: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: resolve_api_key(&cfg.auth),
            max_retries: cfg.max_retries,
            retry_backoff: Duration::from_millis(cfg.retry_backoff_ms),
            client,
        })
    }

    /// Override the resolved credential (e.g. from a CLI flag).
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|k| !k.trim().is_empty());
        self
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn generate_url(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, api_key
        )
    }

    async fn send_once(&self, req: &GenerateRequest, api_key: &str) -> Result<GenerateResponse> {
        let url = self.generate_url(&req.model, api_key);
        let body = build_body(req);

        tracing::debug!(
            provider = %self.id,
            model = %req.model,
            url = %redact_url_key(&url),
            turns = req.turns.len(),
            web_search = req.tools.web_search,
            "gemini generate request"
        );

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Gateway {
                kind: GatewayErrorKind::from_http(status.as_u16(), &resp_text),
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        Ok(parse_response(&resp_json))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request serialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) fn build_body(req: &GenerateRequest) -> Value {
    let contents: Vec<Value> = req.turns.iter().map(turn_to_gemini).collect();

    let mut body = serde_json::json!({
        "contents": contents,
    });

    if !req.system_instruction.trim().is_empty() {
        body["systemInstruction"] = serde_json::json!({
            "parts": [{"text": req.system_instruction}]
        });
    }

    if req.tools.web_search {
        body["tools"] = serde_json::json!([{ "google_search": {} }]);
    }

    if !req.response_modalities.is_empty() {
        let modalities: Vec<&str> = req
            .response_modalities
            .iter()
            .map(|m| match m {
                Modality::Text => "TEXT",
                Modality::Image => "IMAGE",
            })
            .collect();
        body["generationConfig"] = serde_json::json!({
            "responseModalities": modalities,
        });
    }

    body
}

fn turn_to_gemini(turn: &Turn) -> Value {
    let role = match turn.role {
        Role::User => "user",
        Role::Model => "model",
    };
    let parts: Vec<Value> = turn.segments.iter().map(segment_to_gemini).collect();
    serde_json::json!({
        "role": role,
        "parts": parts,
    })
}

fn segment_to_gemini(segment: &Segment) -> Value {
    match segment {
        Segment::Text { text } => serde_json::json!({"text": text}),
        Segment::InlineBlob { mime_type, data } => serde_json::json!({
            "inlineData": {
                "mimeType": mime_type,
                "data": STANDARD.encode(data),
            }
        }),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse a `generateContent` response body.
///
/// A response without candidates (e.g. blocked by safety filters) yields
/// the fallback text rather than an error.
pub(crate) fn parse_response(body: &Value) -> GenerateResponse {
    let Some(candidate) = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
    else {
        if let Some(reason) = body.pointer("/promptFeedback/blockReason").and_then(|v| v.as_str()) {
            tracing::warn!(block_reason = %reason, "gemini returned no candidates");
        }
        return GenerateResponse::new("", Vec::new(), Vec::new());
    };

    let mut text = String::new();
    let mut parts: Vec<Segment> = Vec::new();

    if let Some(raw_parts) = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        for part in raw_parts {
            if part.get("thought").and_then(|v| v.as_bool()).unwrap_or(false) {
                continue;
            }
            if let Some(t) = part.get("text").and_then(|v| v.as_str()) {
                text.push_str(t);
                parts.push(Segment::text(t));
            }
            if let Some(inline) = part.get("inlineData") {
                let mime_type = inline
                    .get("mimeType")
                    .and_then(|v| v.as_str())
                    .unwrap_or("application/octet-stream");
                let data = inline.get("data").and_then(|v| v.as_str()).unwrap_or("");
                match STANDARD.decode(data) {
                    Ok(bytes) => parts.push(Segment::blob(mime_type, bytes)),
                    Err(e) => {
                        tracing::warn!(mime_type = %mime_type, error = %e, "dropping undecodable inline data");
                    }
                }
            }
        }
    }

    let grounding_chunks = candidate
        .pointer("/groundingMetadata/groundingChunks")
        .and_then(|c| c.as_array())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.get("web")?;
                    Some(Citation {
                        uri: web.get("uri").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                        title: web.get("title").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    GenerateResponse::new(text, parts, grounding_chunks)
}

/// Failures worth another attempt: quota, server errors, transport.
fn is_transient(err: &Error) -> bool {
    match err {
        Error::Gateway { kind, message } => {
            *kind == GatewayErrorKind::QuotaExceeded || message.starts_with("HTTP 5")
        }
        Error::Timeout(_) | Error::Http(_) => true,
        _ => false,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("no API key configured".into()))?;

        let mut attempt: u32 = 0;
        loop {
            match self.send_once(req, api_key).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < self.max_retries && is_transient(&e) => {
                    let backoff = self.retry_backoff * 2u32.saturating_pow(attempt);
                    tracing::warn!(
                        provider = %self.id,
                        model = %req.model,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "gemini call failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(Error::Config(
                "no API key configured for the model gateway".into(),
            )),
        }
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
