use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::EmailConfig;
use crate::models::registrant::Registrant;
use crate::services::email_template::{render_registrant_email, EmailLinks, NOTIFICATION_SUBJECT};

const EMAIL_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No provider credential is configured.
    Skipped,
}

/// Tells administrators about a new registrant.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, registrant: &Registrant) -> Result<Delivery, NotifyError>;
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: String,
}

/// Sends the admin email through a transactional-email HTTP API
/// (bearer auth, `{from, to, subject, html}` body).
pub struct EmailNotifier {
    client: Client,
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(EMAIL_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, registrant: &Registrant) -> Result<Delivery, NotifyError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!(id = %registrant.id, "Email API key not set, skipping notification");
            return Ok(Delivery::Skipped);
        };

        let links = EmailLinks {
            chat_link: &self.config.chat_link,
            dashboard_url: self.config.dashboard_url.as_deref(),
        };
        let body = EmailRequest {
            from: &self.config.from,
            to: &self.config.admin_recipients,
            subject: NOTIFICATION_SUBJECT,
            html: render_registrant_email(registrant, links),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            id = %registrant.id,
            recipients = self.config.admin_recipients.len(),
            "Admin notification sent"
        );
        Ok(Delivery::Sent)
    }
}

/// Sends the notification on a detached task. The outcome is only logged;
/// callers may await the handle but nothing depends on it.
pub fn dispatch(notifier: Arc<dyn Notifier>, registrant: Registrant) -> JoinHandle<()> {
    tokio::spawn(async move {
        match notifier.notify(&registrant).await {
            Ok(Delivery::Sent) => {}
            Ok(Delivery::Skipped) => {
                tracing::debug!(id = %registrant.id, "Notification skipped");
            }
            Err(e) => {
                tracing::error!(id = %registrant.id, error = %e, "Admin notification failed");
            }
        }
    })
}
