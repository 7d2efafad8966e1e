//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event's start has already elapsed
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        now > self.starts_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category_id: Option<i64>,
}

/// Search filters applied by the event listing
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Substring match against name, description or location
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub starts_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
}

/// Aggregate counts surfaced on the management dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardCounts {
    pub total_events: i64,
    pub total_participants: i64,
    pub total_categories: i64,
    pub upcoming_events: i64,
    pub past_events: i64,
}
