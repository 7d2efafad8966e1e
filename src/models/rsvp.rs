//! RSVP model
//!
//! An RSVP row is unique per (user, event) and is reused across state
//! transitions rather than duplicated. At most one row per event may hold
//! confirmed status at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rsvp {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub status: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rsvp {
    pub fn status(&self) -> Option<RsvpStatus> {
        RsvpStatus::parse(&self.status)
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == RsvpStatus::Confirmed.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStatus {
    Confirmed,
    Cancelled,
    Pending,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Confirmed => "confirmed",
            RsvpStatus::Cancelled => "cancelled",
            RsvpStatus::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Option<RsvpStatus> {
        match value {
            "confirmed" => Some(RsvpStatus::Confirmed),
            "cancelled" => Some(RsvpStatus::Cancelled),
            "pending" => Some(RsvpStatus::Pending),
            _ => None,
        }
    }
}

impl std::fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tallies shown on the RSVP management screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsvpSummary {
    pub total: i64,
    pub confirmed: i64,
    pub cancelled: i64,
}
