use crate::domain::model::NotificationPayload;
use crate::domain::ports::Notifier;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Prints the payload to stdout instead of mailing it. Used for dry runs.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<()> {
        println!("Subject: {}\n\n{}", payload.subject, payload.body);
        Ok(())
    }
}
