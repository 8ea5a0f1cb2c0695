use crate::config::EmailConfig;
use crate::domain::delivery::Tag;
use crate::services::notification::provider::{EmailProvider, OutboundEmail, ProviderError, ProviderReceipt};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    tags: &'a [Tag],
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Resend HTTP mail provider. The client timeout doubles as the per-attempt
/// delivery bound; a timed-out request surfaces as a retryable failure.
#[derive(Clone, Debug)]
pub struct ResendMailer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ResendMailer {
    /// Builds the provider client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(config.send_timeout_secs)).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl EmailProvider for ResendMailer {
    #[tracing::instrument(level = "debug", skip(self, email), fields(subject = %email.subject))]
    async fn send_email(&self, email: &OutboundEmail) -> Result<ProviderReceipt, ProviderError> {
        let request = SendRequest {
            from: &email.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
            tags: &email.tags,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(anyhow::Error::new)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::QuotaExceeded);
        }
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map_or_else(|_| format!("HTTP {status}"), |body| body.message);
            return Err(ProviderError::Rejected(message));
        }

        let body: SendResponse = response.json().await.map_err(anyhow::Error::new)?;
        Ok(ProviderReceipt { id: body.id })
    }
}
