use serde::{Deserialize, Serialize};

/// Shared error type used across all Council crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("gateway {kind}: {message}")]
    Gateway {
        kind: GatewayErrorKind,
        message: String,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("attachment: {0}")]
    Attachment(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a gateway error, classifying the message text.
    pub fn gateway(message: impl Into<String>) -> Self {
        let message = message.into();
        Error::Gateway {
            kind: GatewayErrorKind::classify(&message),
            message,
        }
    }

    /// Gateway classification for this error.
    ///
    /// Transport failures (HTTP, timeout) count as [`GatewayErrorKind::Unknown`].
    pub fn gateway_kind(&self) -> GatewayErrorKind {
        match self {
            Error::Gateway { kind, .. } => *kind,
            _ => GatewayErrorKind::Unknown,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Gateway error classification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Markers in a vendor error body that identify an exhausted quota.
const QUOTA_MARKERS: &[&str] = &["RESOURCE_EXHAUSTED"];

/// Markers in a vendor error body that identify a rejected credential.
const CREDENTIAL_MARKERS: &[&str] = &["API key not valid", "API_KEY_INVALID"];

/// Structured classification of a model gateway failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// Rate limit or quota exhausted.
    QuotaExceeded,
    /// The API credential was rejected.
    InvalidCredential,
    /// Anything else.
    Unknown,
}

impl GatewayErrorKind {
    /// Classify a raw vendor error message.
    pub fn classify(message: &str) -> Self {
        if QUOTA_MARKERS.iter().any(|m| message.contains(m)) {
            GatewayErrorKind::QuotaExceeded
        } else if CREDENTIAL_MARKERS.iter().any(|m| message.contains(m)) {
            GatewayErrorKind::InvalidCredential
        } else {
            GatewayErrorKind::Unknown
        }
    }

    /// Classify an HTTP failure. A 429 is always a quota error; otherwise
    /// the body decides.
    pub fn from_http(status: u16, body: &str) -> Self {
        if status == 429 {
            return GatewayErrorKind::QuotaExceeded;
        }
        Self::classify(body)
    }
}

impl std::fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorKind::QuotaExceeded => "quota_exceeded",
            GatewayErrorKind::InvalidCredential => "invalid_credential",
            GatewayErrorKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
