//! Error handling for EventHub
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for EventHub operations
#[derive(Error, Debug)]
pub enum EventHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot RSVP to past events.")]
    PastEvent { event_id: i64 },

    #[error("This event already has a confirmed RSVP. Only one person can RSVP per event.")]
    EventAlreadyReserved { event_id: i64 },

    #[error("Access denied. {0}")]
    AccessDenied(String),

    #[error("Failed to deliver notification: {0}")]
    NotificationDelivery(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("RSVP not found: {rsvp_id}")]
    RsvpNotFound { rsvp_id: i64 },

    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: i64 },

    #[error("Cannot delete core group: {0}")]
    CoreGroupProtected(String),

    #[error("Cannot delete your own account")]
    CannotDeleteSelf,

    #[error("Cannot delete superuser accounts")]
    CannotDeleteSuperuser,

    #[error("Invalid activation link.")]
    InvalidActivationToken,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for EventHub operations
pub type Result<T> = std::result::Result<T, EventHubError>;

impl EventHubError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventHubError::Database(_) => false,
            EventHubError::Migration(_) => false,
            EventHubError::Config(_) => false,
            EventHubError::NotificationDelivery(_) => true,
            EventHubError::Io(_) => true,
            EventHubError::EventAlreadyReserved { .. } => true,
            _ => false,
        }
    }

    /// True for validation failures the caller should render as a message
    /// on the originating page rather than treat as a fault.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            EventHubError::PastEvent { .. }
                | EventHubError::EventAlreadyReserved { .. }
                | EventHubError::AccessDenied(_)
                | EventHubError::CoreGroupProtected(_)
                | EventHubError::CannotDeleteSelf
                | EventHubError::CannotDeleteSuperuser
                | EventHubError::InvalidActivationToken
                | EventHubError::InvalidInput(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventHubError::Database(_) => ErrorSeverity::Critical,
            EventHubError::Migration(_) => ErrorSeverity::Critical,
            EventHubError::Config(_) => ErrorSeverity::Critical,
            EventHubError::AccessDenied(_) => ErrorSeverity::Warning,
            EventHubError::NotificationDelivery(_) => ErrorSeverity::Warning,
            EventHubError::PastEvent { .. } => ErrorSeverity::Info,
            EventHubError::EventAlreadyReserved { .. } => ErrorSeverity::Info,
            EventHubError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
