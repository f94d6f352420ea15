//! # Outbound Notifications
//!
//! Fire-and-forget email dispatch.
//!
//! Services hand a templated [`EmailMessage`] to a [`Notifier`] and move on;
//! delivery happens in the background and failures are only logged. Two
//! senders ship with the crate:
//!
//! - [`LogNotifier`]: logs the rendered message, used when no SMTP relay is configured
//! - [`SmtpNotifier`]: delivers through an SMTP relay with `lettre`

// region: --- Modules
pub mod smtp;
// endregion: --- Modules

pub use smtp::SmtpNotifier;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Templates the service knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailTemplate {
    /// Expects `{"verify_code": "123456"}`
    VerifyCode,
}

impl EmailTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplate::VerifyCode => "verify-code",
        }
    }

    /// Render the plain-text body for `data`.
    pub fn render(&self, data: &Value) -> String {
        match self {
            EmailTemplate::VerifyCode => {
                let code = data.get("verify_code").and_then(Value::as_str).unwrap_or_default();
                format!(
                    "Hello!\n\nYour verification code is: {code}\n\n\
                     Enter it to confirm your email address.\n\
                     If you did not request it, ignore this message.\n"
                )
            }
        }
    }
}

/// A templated message addressed to one or more recipients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub subject: String,
    pub to: Vec<String>,
    pub template: EmailTemplate,
    pub data: Value,
}

impl EmailMessage {
    /// Verification code mail for `email`.
    pub fn verify_code(email: &str, code: &str) -> Self {
        Self {
            subject: "Your service: verify code".to_string(),
            to: vec![email.to_string()],
            template: EmailTemplate::VerifyCode,
            data: serde_json::json!({ "verify_code": code }),
        }
    }

    pub fn body(&self) -> String {
        self.template.render(&self.data)
    }
}

/// Email delivery abstraction. Implementations must not block the caller and
/// never report failures back.
pub trait Notifier: Send + Sync {
    fn send(&self, message: EmailMessage);
}

/// Local dev sender that logs the message instead of sending real email.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, message: EmailMessage) {
        info!(
            to = ?message.to,
            subject = %message.subject,
            template = message.template.as_str(),
            "[MAIL] {}",
            message.body()
        );
    }
}
