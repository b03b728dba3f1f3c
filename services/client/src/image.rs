//! Session and material images
//!
//! Images go to an external host that answers with a public URL. When the host
//! is unreachable the form keeps going with a local data URL preview.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::warn;

use crate::error::{ClientError, ClientResult};

/// Largest accepted image
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image picked by the user
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reject non-images and files over [`MAX_IMAGE_BYTES`]
    pub fn validate(&self) -> ClientResult<()> {
        if !self.content_type.starts_with("image/") {
            return Err(ClientError::Upload(format!(
                "{} is not an image ({})",
                self.name, self.content_type
            )));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ClientError::Upload(format!(
                "{} is larger than 5 MB",
                self.name
            )));
        }
        Ok(())
    }

    /// Inline `data:` URL for showing the image before it is hosted
    pub fn preview_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// External image host
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload `file` and return its public URL
    async fn upload(&self, file: &ImageFile) -> ClientResult<String>;
}

/// Upload `file`, falling back to a local preview URL when the host fails
///
/// Invalid files are refused before any upload is attempted.
pub async fn upload_or_preview(host: &dyn ImageHost, file: &ImageFile) -> ClientResult<String> {
    file.validate()?;
    match host.upload(file).await {
        Ok(url) => Ok(url),
        Err(e) => {
            warn!("Image upload for {} failed, using local preview: {}", file.name, e);
            Ok(file.preview_url())
        }
    }
}
