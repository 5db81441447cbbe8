use crate::config::SmtpSettings;
use crate::domain::model::NotificationPayload;
use crate::domain::ports::Notifier;
use crate::utils::error::{MonitorError, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends notifications over SMTP with STARTTLS and login credentials.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let from = settings
            .from_email
            .parse::<Mailbox>()
            .map_err(|e| MonitorError::notify(format!("invalid sender address: {}", e)))?;
        let to = settings
            .to_email
            .parse::<Mailbox>()
            .map_err(|e| MonitorError::notify(format!("invalid recipient address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
            .map_err(MonitorError::notify)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { transport, from, to })
    }

    pub fn build_message(&self, payload: &NotificationPayload) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(payload.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(payload.body.clone())
            .map_err(MonitorError::notify)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        let message = self.build_message(payload)?;

        tracing::debug!("Sending \"{}\" to {}", payload.subject, self.to);
        self.transport
            .send(message)
            .await
            .map_err(MonitorError::notify)?;

        tracing::info!("Notification email sent to {}", self.to);
        Ok(())
    }
}
