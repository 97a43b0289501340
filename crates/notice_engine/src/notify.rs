//! Outbound notification channels.
//!
//! A channel receives the fully formatted digest and only reports whether it
//! was delivered.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use notice_logging::notice_info;
use reqwest::header::CONTENT_TYPE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid address '{address}': {message}")]
    Address { address: String, message: String },
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("smtp: {0}")]
    Smtp(String),
    #[error("webhook request failed: {0}")]
    Http(String),
    #[error("webhook answered with status {0}")]
    HttpStatus(u16),
    #[error("send task aborted: {0}")]
    Task(String),
}

#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Label used in logs and failure reports.
    fn name(&self) -> &str;

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: Vec<String>,
}

impl EmailSettings {
    /// Gmail-style account that mails itself.
    pub fn self_addressed(address: impl Into<String>, password: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            username: address.clone(),
            password: password.into(),
            from: address.clone(),
            to: vec![address],
        }
    }
}

/// SMTP over implicit TLS.
#[derive(Debug, Clone)]
pub struct EmailChannel {
    settings: EmailSettings,
}

impl EmailChannel {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    fn build_message(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.settings.from)?)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.settings.to {
            builder = builder.to(parse_mailbox(recipient)?);
        }
        builder
            .body(notification.body.clone())
            .map_err(|err| NotifyError::Message(err.to_string()))
    }
}

#[async_trait::async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.build_message(notification)?;
        let transport = SmtpTransport::relay(&self.settings.smtp_host)
            .map_err(|err| NotifyError::Smtp(err.to_string()))?
            .port(self.settings.smtp_port)
            .credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ))
            .build();

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|err| NotifyError::Task(err.to_string()))?
            .map_err(|err| NotifyError::Smtp(err.to_string()))?;

        notice_info!(
            "Email sent to {} recipient(s) via {}",
            self.settings.to.len(),
            self.settings.smtp_host
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|err: lettre::address::AddressError| NotifyError::Address {
        address: address.to_string(),
        message: err.to_string(),
    })
}

/// Chat webhook accepting a JSON `{"text": ...}` payload (Slack, Mattermost, ...).
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    url: String,
    timeout: Duration,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "text": format!("{}\n\n{}", notification.subject, notification.body),
        });
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| NotifyError::Http(err.to_string()))?;

        let response = client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|err| NotifyError::Http(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus(status.as_u16()));
        }
        notice_info!("Webhook accepted digest ({})", status);
        Ok(())
    }
}
