use reqwest::Client;
use std::time::Duration;

use crate::core::moderation::AttachmentError;

/// Downloads attachment bytes from the Discord CDN.
///
/// Every request is bounded by the configured timeout, so a stalled download
/// surfaces as an `AttachmentError` instead of holding up the handler.
#[derive(Clone)]
pub struct AttachmentFetcher {
    client: Client,
}

impl AttachmentFetcher {
    pub fn new(timeout: Duration) -> Result<Self, AttachmentError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("ImageBanBot/1.0")
            .build()
            .map_err(|e| AttachmentError::Fetch(e.to_string()))?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, AttachmentError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttachmentError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttachmentError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AttachmentError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
