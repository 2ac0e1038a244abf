//! Email delivery of removal requests over SMTP.

use crate::error::TransportError;
use crate::transport::RemovalTransport;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use veil_broker::{BrokerDefinition, RemovalProcess};
use veil_core::{SmtpSettings, UserData};

const SUBJECT: &str = "Personal Data Removal Request";

/// Sends email-process requests through an SMTP relay.
///
/// Form and API brokers cannot be reached by email; they fail permanently so
/// the user is told to submit manually.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    /// Build a relay transport from settings.
    ///
    /// # Errors
    /// Returns `TransportError::Permanent` if the host or sender address is
    /// invalid.
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self, TransportError> {
        if settings.host.trim().is_empty() {
            return Err(TransportError::Permanent(
                "SMTP host is not configured".to_string(),
            ));
        }

        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|e| TransportError::Permanent(format!("bad from address: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| TransportError::Permanent(format!("SMTP relay error: {e}")))?
            .port(settings.port);

        if let Some(password) = &settings.password {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                password.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    fn build_message(
        &self,
        broker: &BrokerDefinition,
        user: &UserData,
        content: &str,
    ) -> Result<Message, TransportError> {
        let to = broker
            .contact_target()
            .parse::<Mailbox>()
            .map_err(|e| TransportError::Permanent(format!("bad broker address: {e}")))?;

        let mut builder = Message::builder().from(self.from.clone()).to(to).subject(SUBJECT);

        // Brokers reply to the person whose data is being removed
        if let Some(reply_to) = user.email().and_then(|e| e.parse::<Mailbox>().ok()) {
            builder = builder.reply_to(reply_to);
        }

        builder
            .body(content.to_string())
            .map_err(|e| TransportError::Permanent(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl RemovalTransport for SmtpTransport {
    async fn attempt_removal(
        &self,
        broker: &BrokerDefinition,
        user: &UserData,
        content: &str,
    ) -> Result<(), TransportError> {
        if broker.removal_process() != RemovalProcess::Email {
            return Err(TransportError::Permanent(format!(
                "manual submission required at {}",
                broker.contact_target()
            )));
        }

        let message = self.build_message(broker, user, content)?;

        self.mailer.send(message).await.map(|_| ()).map_err(|e| {
            if e.is_permanent() {
                TransportError::Permanent(format!("SMTP send failed: {e}"))
            } else {
                TransportError::Transient(format!("SMTP send failed: {e}"))
            }
        })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_broker::{BrokerDirectory, BrokerRegistry};
    use veil_core::BrokerId;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            ..SmtpSettings::default()
        }
    }

    fn broker(id: &str) -> BrokerDefinition {
        BrokerRegistry::with_defaults()
            .lookup(&BrokerId::new(id).expect("valid broker ID"))
            .expect("built-in broker")
    }

    #[test]
    fn test_missing_host_rejected() {
        let result = SmtpTransport::from_settings(&SmtpSettings::default());
        assert!(matches!(result, Err(TransportError::Permanent(_))));
    }

    #[tokio::test]
    async fn test_form_broker_needs_manual_submission() {
        let transport = SmtpTransport::from_settings(&settings()).expect("build transport");
        let user = UserData::new("Jane", "Doe", "jane@x.com");

        let err = transport
            .attempt_removal(&broker("2"), &user, "")
            .await
            .expect_err("form brokers are not emailed");
        assert_eq!(
            err,
            TransportError::Permanent(
                "manual submission required at https://www.experian.com/privacy/opting-out"
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_message_addresses() {
        let transport = SmtpTransport::from_settings(&settings()).expect("build transport");
        let user = UserData::new("Jane", "Doe", "jane@x.com");

        let message = transport
            .build_message(&broker("3"), &user, "Please remove Jane Doe")
            .expect("build message");
        let headers = message.headers().to_string();
        assert!(headers.contains("To: privacy@spokeo.com"));
        assert!(headers.contains("Reply-To: jane@x.com"));
        assert!(headers.contains(SUBJECT));
    }
}
