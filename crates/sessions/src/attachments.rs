//! File-backed attachment storage.
//!
//! Each attachment is written once to `attachments/<uuid>` under the state
//! path. History keeps only the [`AttachmentRef`]; the bytes are read back
//! whenever a conversation is rebuilt.

use std::path::{Path, PathBuf};

use council_domain::error::{Error, Result};
use council_domain::turn::{AttachmentRef, PendingAttachment};
use council_pipeline::AttachmentResolver;

pub struct FileAttachmentResolver {
    dir: PathBuf,
}

impl FileAttachmentResolver {
    /// Open (creating if needed) `state_path/attachments`.
    pub fn new(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("attachments");
        std::fs::create_dir_all(&dir).map_err(Error::Io)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the attachment and return the reference to keep in history.
    pub async fn store(&self, attachment: &PendingAttachment) -> Result<AttachmentRef> {
        let handle = uuid::Uuid::new_v4().to_string();
        tokio::fs::write(self.dir.join(&handle), &attachment.data)
            .await
            .map_err(Error::Io)?;

        tracing::debug!(
            handle = %handle,
            name = %attachment.name,
            bytes = attachment.data.len(),
            "attachment stored"
        );

        Ok(AttachmentRef {
            handle,
            mime_type: attachment.mime_type.clone(),
            name: attachment.name.clone(),
        })
    }

    /// Delete a stored attachment. Missing files are not an error.
    pub fn remove(&self, handle: &str) -> Result<()> {
        let path = self.path_for(handle)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Handles are UUIDs; anything else never maps to a path.
    fn path_for(&self, handle: &str) -> Result<PathBuf> {
        let id = uuid::Uuid::parse_str(handle)
            .map_err(|_| Error::Attachment(format!("invalid attachment handle {handle:?}")))?;
        Ok(self.dir.join(id.to_string()))
    }
}

#[async_trait::async_trait]
impl AttachmentResolver for FileAttachmentResolver {
    async fn resolve(&self, attachment: &AttachmentRef) -> Result<Vec<u8>> {
        let path = self.path_for(&attachment.handle)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| Error::Attachment(format!("reading {}: {e}", attachment.name)))
    }
}
