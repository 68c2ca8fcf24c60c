use crate::domain::notification::Email;
use crate::domain::ports::MailTransport;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Mail transport that records outgoing messages in the log instead of
/// talking to an SMTP relay.
#[derive(Debug, Default, Clone)]
pub struct LogMailTransport;

impl LogMailTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, email: &Email) -> Result<String> {
        let message_id = format!("<{}@coursepay.local>", Uuid::new_v4());
        info!(
            to = %email.to,
            subject = %email.subject,
            message_id = %message_id,
            "Email sent"
        );
        Ok(message_id)
    }
}
