//! Participant model
//!
//! Participants are created implicitly as a side effect of a user's first
//! confirmed RSVP, keyed by (name, email).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateParticipantRequest {
    pub name: String,
    pub email: String,
}
