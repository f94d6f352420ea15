//! SMTP delivery through `lettre`.
//!
//! `SmtpTransport` is blocking, so each message is sent on the blocking pool.

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{Message, SmtpTransport, Transport};
use lib_core::{AppError, SmtpConfig};
use tracing::{debug, error};

use super::{EmailMessage, Notifier};

#[derive(Clone)]
pub struct SmtpNotifier {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid SMTP_FROM address: {e}")))?;

        let mailer = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::Config(format!("Failed to create SMTP transport: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .pool_config(PoolConfig::new().max_size(4))
            .timeout(Some(std::time::Duration::from_secs(10)))
            .build();

        Ok(Self { mailer, from })
    }

    fn build(&self, message: &EmailMessage) -> Result<Message, String> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN);

        for to in &message.to {
            let mailbox: Mailbox = to.parse().map_err(|e| format!("Invalid to address {to}: {e}"))?;
            builder = builder.to(mailbox);
        }

        builder
            .body(message.body())
            .map_err(|e| format!("Failed to create email: {e}"))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, message: EmailMessage) {
        let email = match self.build(&message) {
            Ok(email) => email,
            Err(e) => {
                error!("[MAIL] {}", e);
                return;
            }
        };

        let mailer = self.mailer.clone();
        let recipients = message.to;
        tokio::task::spawn_blocking(move || match mailer.send(&email) {
            Ok(_) => debug!("[MAIL] Sent to {:?}", recipients),
            Err(e) => error!("[MAIL] Failed to send email to {:?}: {}", recipients, e),
        });
    }
}
