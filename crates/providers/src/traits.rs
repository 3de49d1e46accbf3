use council_domain::citation::Citation;
use council_domain::error::Result;
use council_domain::turn::{Segment, Turn};

/// Substituted when the model returns no text.
pub const NO_RESPONSE_TEXT: &str = "Could not get a response.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Optional gateway-side tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolConfig {
    /// Ground the answer with web search and return citations.
    pub web_search: bool,
}

/// Output kinds a model may be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Text,
    Image,
}

/// One generate call.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub model: String,
    /// Ordered conversation; the gateway treats it as opaque.
    pub turns: Vec<Turn>,
    /// Empty means no system instruction is sent.
    pub system_instruction: String,
    pub tools: ToolConfig,
    /// Empty means the gateway default (text only).
    pub response_modalities: Vec<Modality>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            turns,
            ..Default::default()
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.tools.web_search = enabled;
        self
    }

    pub fn with_modalities(mut self, modalities: &[Modality]) -> Self {
        self.response_modalities = modalities.to_vec();
        self
    }
}

/// The result of one generate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResponse {
    /// Concatenated text. Never empty: see [`NO_RESPONSE_TEXT`].
    pub text: String,
    /// Content parts in model order (text and inline images).
    pub parts: Vec<Segment>,
    /// Web sources from grounding metadata, unfiltered.
    pub grounding_chunks: Vec<Citation>,
}

impl GenerateResponse {
    /// Build a response, substituting the fallback for missing text.
    pub fn new(text: impl Into<String>, parts: Vec<Segment>, grounding_chunks: Vec<Citation>) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() {
            NO_RESPONSE_TEXT.to_string()
        } else {
            text
        };
        Self {
            text,
            parts,
            grounding_chunks,
        }
    }

    /// Text-only response.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let parts = vec![Segment::text(text.clone())];
        Self::new(text, parts, Vec::new())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core gateway trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A hosted text/image generation endpoint.
///
/// Every call is independently fallible. Implementations classify failures
/// as [`council_domain::error::Error::Gateway`] so callers never match on
/// vendor message text.
#[async_trait::async_trait]
pub trait ModelGateway: Send + Sync {
    /// Run one generate call and wait for the full response.
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse>;

    /// Check that the gateway can be called at all (e.g. a credential is
    /// present). Called once per turn before any request is issued.
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// A unique identifier for this gateway instance.
    fn provider_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gets_fallback() {
        let resp = GenerateResponse::new("   ", Vec::new(), Vec::new());
        assert_eq!(resp.text, NO_RESPONSE_TEXT);
    }

    #[test]
    fn builder_sets_tools_and_modalities() {
        let req = GenerateRequest::new("m", vec![Turn::user("hi")])
            .with_instruction("be brief")
            .with_web_search(true)
            .with_modalities(&[Modality::Text, Modality::Image]);
        assert_eq!(req.system_instruction, "be brief");
        assert!(req.tools.web_search);
        assert_eq!(req.response_modalities.len(), 2);
    }
}
