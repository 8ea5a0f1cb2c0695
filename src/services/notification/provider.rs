use crate::domain::delivery::Tag;
use async_trait::async_trait;
use thiserror::Error;

/// Fully addressed email ready for the delivery provider.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub tags: Vec<Tag>,
}

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone)]
pub struct ProviderReceipt {
    pub id: String,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider rejected the message: {0}")]
    Rejected(String),
    #[error("Provider rate limit exceeded")]
    QuotaExceeded,
    #[error("External service error: {0}")]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait EmailProvider: Send + Sync + std::fmt::Debug {
    /// Delivers one email through the external provider.
    ///
    /// # Errors
    /// Returns a `ProviderError` on rejection, quota exhaustion, or transport
    /// failure (timeouts included). All variants are retryable from the
    /// sender's point of view.
    async fn send_email(&self, email: &OutboundEmail) -> Result<ProviderReceipt, ProviderError>;
}
