//! Notification service implementation
//!
//! This service formats and sends the three transactional emails the system
//! produces: account activation, RSVP confirmation and RSVP cancellation.
//! Delivery is best-effort by policy: a failed send is logged and never
//! propagated, so it cannot undo a committed state change.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::Arc;
use tracing::debug;

use crate::config::MailConfig;
use crate::models::{Event, User};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::log_mail_outcome;

/// Destination-agnostic mail sink; the SMTP implementation is the production
/// one, tests substitute a recording fake
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()>;
}

/// SMTP sink backed by lettre
#[derive(Clone)]
pub struct SmtpNotifier {
    config: MailConfig,
    credentials: Credentials,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig) -> Self {
        let credentials =
            Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
        Self { config, credentials }
    }

    /// A fresh transport per message avoids held-open connections
    fn build_transport(&self) -> Result<SmtpTransport> {
        let transport = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| EventHubError::NotificationDelivery(format!("SMTP relay error: {e}")))?
            .port(self.config.smtp_port)
            .credentials(self.credentials.clone())
            .build();

        Ok(transport)
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.config.from_name, self.config.from_email)
    }
}

#[async_trait]
impl NotificationSink for SmtpNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let email = Message::builder()
            .from(self.from_header().parse().map_err(|e| {
                EventHubError::NotificationDelivery(format!("Invalid from address: {e}"))
            })?)
            .to(recipient.parse().map_err(|e| {
                EventHubError::NotificationDelivery(format!("Invalid to address: {e}"))
            })?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EventHubError::NotificationDelivery(format!("Failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer.send(&email).map_err(|e| {
                EventHubError::NotificationDelivery(format!("Failed to send email: {e}"))
            })
        })
        .await
        .map_err(|e| EventHubError::NotificationDelivery(format!("Email task failed: {e}")))?
        .map(|_| ())
    }
}

/// Notification service: builds message bodies and dispatches them through
/// the configured sink
#[derive(Clone)]
pub struct NotificationService {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationService {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Send the account activation email. Best-effort.
    pub async fn send_activation(&self, user: &User, activation_url: &str) {
        let subject = "Activate Your Account - EventHub";
        let body = activation_body(user, activation_url);
        self.send_best_effort(&user.email, subject, &body).await;
    }

    /// Send the RSVP confirmation email after a successful confirm. Best-effort.
    pub async fn send_rsvp_confirmation(&self, user: &User, event: &Event, category_name: &str) {
        let subject = format!("RSVP Confirmation - {}", event.name);
        let body = confirmation_body(user, event, category_name);
        self.send_best_effort(&user.email, &subject, &body).await;
    }

    /// Send the RSVP cancellation email after a successful cancel. Best-effort.
    pub async fn send_rsvp_cancellation(&self, user: &User, event: &Event) {
        let subject = format!("RSVP Cancellation - {}", event.name);
        let body = cancellation_body(user, event);
        self.send_best_effort(&user.email, &subject, &body).await;
    }

    async fn send_best_effort(&self, recipient: &str, subject: &str, body: &str) {
        debug!(recipient = recipient, subject = subject, "Sending notification");
        match self.sink.send(recipient, subject, body).await {
            Ok(()) => log_mail_outcome(recipient, subject, true, None),
            Err(e) => log_mail_outcome(recipient, subject, false, Some(&e.to_string())),
        }
    }
}

fn greeting_name(user: &User) -> &str {
    if user.first_name.is_empty() {
        &user.username
    } else {
        &user.first_name
    }
}

fn activation_body(user: &User, activation_url: &str) -> String {
    format!(
        "Hi {},\n\n\
         Thank you for registering at EventHub!\n\n\
         Please activate your account by clicking the link below:\n\
         {}\n\n\
         If the link doesn't work, copy and paste it into your browser.\n\n\
         Thank you!\n\
         EventHub Team",
        user.username, activation_url
    )
}

fn confirmation_body(user: &User, event: &Event, category_name: &str) -> String {
    format!(
        "Hello {},\n\n\
         You have successfully RSVP'd for the event: '{}'\n\n\
         Event Details:\n\
         - Date: {}\n\
         - Time: {}\n\
         - Location: {}\n\
         - Category: {}\n\n\
         IMPORTANT: You are the exclusive RSVP for this event. Only one person can RSVP per event.\n\n\
         You have also been automatically added as a participant for this event.\n\n\
         We look forward to seeing you at the event!\n\n\
         Best regards,\n\
         EventHub Team",
        greeting_name(user),
        event.name,
        event.starts_at.format("%Y-%m-%d"),
        event.starts_at.format("%H:%M"),
        event.location,
        category_name
    )
}

fn cancellation_body(user: &User, event: &Event) -> String {
    format!(
        "Hello {},\n\n\
         Your RSVP for the event '{}' has been cancelled.\n\n\
         Event Details:\n\
         - Date: {}\n\
         - Time: {}\n\
         - Location: {}\n\n\
         You can still RSVP again if you change your mind before the event date.\n\n\
         Best regards,\n\
         EventHub Team",
        greeting_name(user),
        event.name,
        event.starts_at.format("%Y-%m-%d"),
        event.starts_at.format("%H:%M"),
        event.location
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Recording sink for tests; optionally fails every send
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<(String, String, String)>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            Self { sent: Mutex::new(Vec::new()), fail: true }
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
            if self.fail {
                return Err(EventHubError::NotificationDelivery("sink down".to_string()));
            }
            self.sent.lock().unwrap().push((
                recipient.to_string(),
                subject.to_string(),
                body.to_string(),
            ));
            Ok(())
        }
    }
}
