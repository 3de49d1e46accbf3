use council_domain::error::{Error, GatewayErrorKind};

/// Why a turn produced no answer. Every variant maps to one fixed,
/// user-facing message via [`TurnError::user_message`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// No usable credential; raised before any gateway call.
    #[error("configuration: {0}")]
    Config(String),

    /// The pending attachment could not be read.
    #[error("attachment: {0}")]
    Attachment(String),

    /// Neither text nor attachment was submitted.
    #[error("empty message")]
    EmptyMessage,

    #[error("gateway {kind}: {detail}")]
    Gateway { kind: GatewayErrorKind, detail: String },
}

impl TurnError {
    /// Map a failed pipeline call onto a turn error.
    pub fn from_gateway(err: Error) -> Self {
        match err {
            Error::Config(msg) | Error::Auth(msg) => TurnError::Config(msg),
            Error::Attachment(msg) => TurnError::Attachment(msg),
            Error::Gateway { kind, message } => TurnError::Gateway {
                kind,
                detail: message,
            },
            other => TurnError::Gateway {
                kind: GatewayErrorKind::Unknown,
                detail: other.to_string(),
            },
        }
    }

    /// Text shown to the user in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            TurnError::Config(_) => "No API key configured. Set one before sending a message.".into(),
            TurnError::Attachment(_) => {
                "Sorry, I couldn't process the attached file. Please try again.".into()
            }
            TurnError::EmptyMessage => "Please enter a message or attach a file.".into(),
            TurnError::Gateway { kind, detail } => match kind {
                GatewayErrorKind::QuotaExceeded => "You have exceeded your API quota. Please check your plan and billing details, or try again later.".into(),
                GatewayErrorKind::InvalidCredential => {
                    "Your API key is not valid. Please check it and try again.".into()
                }
                GatewayErrorKind::Unknown => format!("An error occurred: {detail}"),
            },
        }
    }
}

impl From<Error> for TurnError {
    fn from(err: Error) -> Self {
        TurnError::from_gateway(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_message() {
        let err = TurnError::from_gateway(Error::gateway("429 RESOURCE_EXHAUSTED: quota"));
        assert_eq!(
            err.user_message(),
            "You have exceeded your API quota. Please check your plan and billing details, or try again later."
        );
    }

    #[test]
    fn credential_message() {
        let err = TurnError::from_gateway(Error::gateway("400 API key not valid. Please pass a valid API key."));
        assert_eq!(
            err.user_message(),
            "Your API key is not valid. Please check it and try again."
        );
    }

    #[test]
    fn unknown_message_carries_detail() {
        let err = TurnError::from_gateway(Error::Http("connection reset".into()));
        assert_eq!(err.user_message(), "An error occurred: HTTP: connection reset");
    }

    #[test]
    fn config_and_attachment_messages() {
        assert_eq!(
            TurnError::from_gateway(Error::Config("no key".into())).user_message(),
            "No API key configured. Set one before sending a message."
        );
        assert_eq!(
            TurnError::Attachment("bad".into()).user_message(),
            "Sorry, I couldn't process the attached file. Please try again."
        );
    }
}
