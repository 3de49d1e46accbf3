//! `council-providers`: model gateway abstraction and the Gemini adapter.

pub mod google;
pub mod traits;
pub mod util;

// Re-exports for convenience.
pub use google::GeminiGateway;
pub use traits::{
    GenerateRequest, GenerateResponse, Modality, ModelGateway, ToolConfig, NO_RESPONSE_TEXT,
};
