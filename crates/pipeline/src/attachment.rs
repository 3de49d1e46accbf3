//! Turning a local file into the pending attachment for a turn.

use std::path::{Path, PathBuf};

use council_domain::error::{Error, Result};
use council_domain::turn::PendingAttachment;

/// Largest payload sent inline to the gateway.
pub const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

/// The attachment submitted with a user message.
#[derive(Debug, Clone)]
pub enum AttachmentInput {
    /// A file still to be read; failures abort the turn before any call.
    Path(PathBuf),
    /// Already converted by the caller.
    Loaded(PendingAttachment),
}

impl AttachmentInput {
    pub async fn load(self) -> Result<PendingAttachment> {
        match self {
            AttachmentInput::Loaded(att) => Ok(att),
            AttachmentInput::Path(path) => load_file(&path).await,
        }
    }
}

/// Read a file and guess its media type from the extension.
pub async fn load_file(path: &Path) -> Result<PendingAttachment> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| Error::Attachment(format!("reading {}: {e}", path.display())))?;

    if data.is_empty() {
        return Err(Error::Attachment(format!("{} is empty", path.display())));
    }
    if data.len() > MAX_INLINE_BYTES {
        return Err(Error::Attachment(format!(
            "{} is {} bytes; the inline limit is {MAX_INLINE_BYTES}",
            path.display(),
            data.len()
        )));
    }

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".into());

    Ok(PendingAttachment {
        name,
        mime_type,
        data,
    })
}
