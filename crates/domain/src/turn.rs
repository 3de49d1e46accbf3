use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One piece of turn content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text {
        text: String,
    },
    InlineBlob {
        mime_type: String,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text { text: text.into() }
    }

    pub fn blob(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Segment::InlineBlob {
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text { text } => Some(text.as_str()),
            Segment::InlineBlob { .. } => None,
        }
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, Segment::InlineBlob { .. })
    }
}

/// A role-tagged message unit as sent to the model gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub segments: Vec<Segment>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            segments: vec![Segment::text(text)],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            segments: vec![Segment::text(text)],
        }
    }

    /// All text segments joined with newlines.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(Segment::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Persisted history
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reference to an attachment stored outside the chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Opaque storage handle understood by an attachment resolver.
    pub handle: String,
    pub mime_type: String,
    /// Original file name, for display and prompt context.
    pub name: String,
}

/// A persisted turn. User turns keep attachments by reference so the
/// history does not grow with encoded payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,
}

impl HistoryTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            segments: vec![Segment::text(text)],
            attachment: None,
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            segments: vec![Segment::text(text)],
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: AttachmentRef) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

impl From<Turn> for HistoryTurn {
    fn from(turn: Turn) -> Self {
        Self {
            role: turn.role,
            segments: turn.segments,
            attachment: None,
        }
    }
}

/// The attachment submitted with the current user message, already loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl PendingAttachment {
    pub fn segment(&self) -> Segment {
        Segment::blob(self.mime_type.clone(), self.data.clone())
    }

    /// Short human-readable description used as prompt context.
    pub fn describe(&self) -> String {
        format!("[Attached file: {} ({})]", self.name, self.mime_type)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_serializes_as_base64() {
        let seg = Segment::blob("image/png", vec![0x89, 0x50, 0x4e, 0x47]);
        let json = serde_json::to_value(&seg).unwrap();
        assert_eq!(json["type"], "inline_blob");
        assert_eq!(json["mime_type"], "image/png");
        assert_eq!(json["data"], "iVBORw==");

        let back: Segment = serde_json::from_value(json).unwrap();
        assert_eq!(back, seg);
    }

    #[test]
    fn history_turn_omits_missing_attachment() {
        let turn = HistoryTurn::user("hello");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(!json.contains("attachment"));
    }

    #[test]
    fn turn_text_skips_blobs() {
        let turn = Turn {
            role: Role::Model,
            segments: vec![
                Segment::text("first"),
                Segment::blob("image/png", vec![1, 2, 3]),
                Segment::text("second"),
            ],
        };
        assert_eq!(turn.text(), "first\nsecond");
    }

    #[test]
    fn pending_attachment_description() {
        let att = PendingAttachment {
            name: "notes.pdf".into(),
            mime_type: "application/pdf".into(),
            data: vec![],
        };
        assert_eq!(att.describe(), "[Attached file: notes.pdf (application/pdf)]");
    }
}
