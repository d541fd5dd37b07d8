// Attachment rules - digest, image classification and size policy.
//
// Everything here is pure except `ImageAttachment::read_bytes`, which is the
// one place the core reaches out to the network (through whatever adapter
// implements the trait).

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

/// File extensions treated as images when the declared media type is missing
/// or unhelpful.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff"];

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Failed to fetch attachment: {0}")]
    Fetch(String),

    #[error("Attachment fetch returned HTTP {0}")]
    Status(u16),
}

/// The narrow view of a file attachment the core needs.
#[async_trait]
pub trait ImageAttachment: Send + Sync {
    fn declared_media_type(&self) -> Option<&str>;
    fn filename(&self) -> &str;
    fn byte_size(&self) -> Option<u64>;
    async fn read_bytes(&self) -> Result<Vec<u8>, AttachmentError>;
}

/// Maximum accepted image size, configured in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSizeLimit {
    megabytes: u64,
}

impl ImageSizeLimit {
    pub fn from_megabytes(megabytes: u64) -> Self {
        Self { megabytes }
    }

    pub fn megabytes(&self) -> u64 {
        self.megabytes
    }

    pub fn bytes(&self) -> u64 {
        self.megabytes.saturating_mul(1024 * 1024)
    }
}

impl Default for ImageSizeLimit {
    fn default() -> Self {
        Self::from_megabytes(8)
    }
}

/// Lowercase hex SHA-256 of the given bytes (always 64 characters).
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// An attachment is an image if it declares an `image/*` media type or its
/// filename carries one of the allowed extensions (case-insensitive).
pub fn is_image(declared_media_type: Option<&str>, filename: &str) -> bool {
    if declared_media_type.is_some_and(|media_type| media_type.starts_with("image/")) {
        return true;
    }

    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// True only when the size is known and strictly above the limit.
/// Unknown sizes pass.
pub fn exceeds_size_limit(byte_size: Option<u64>, limit_bytes: u64) -> bool {
    byte_size.is_some_and(|size| size > limit_bytes)
}
