//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the EventHub application.

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration. The returned guard must stay
/// alive for the lifetime of the process or buffered log lines are dropped.
pub fn init_logging(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "eventhub.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log RSVP lifecycle transitions with structured data
pub fn log_rsvp_action(user_id: i64, event_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        event_id = event_id,
        action = action,
        details = details,
        "RSVP action performed"
    );
}

/// Log role-management actions performed through the admin surface
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log mail delivery outcomes; failures are isolated by policy so they land
/// here instead of propagating to the caller
pub fn log_mail_outcome(recipient: &str, subject: &str, success: bool, error: Option<&str>) {
    if success {
        info!(recipient = recipient, subject = subject, "Notification sent");
    } else {
        error!(
            recipient = recipient,
            subject = subject,
            error = error,
            "Notification delivery failed"
        );
    }
}

/// Log access-control decisions
pub fn log_access_decision(user_id: Option<i64>, capability: &str, allowed: bool) {
    if allowed {
        info!(user_id = user_id, capability = capability, "Access granted");
    } else {
        warn!(user_id = user_id, capability = capability, "Access denied");
    }
}
