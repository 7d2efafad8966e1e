//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::role::RoleSet;
use crate::utils::errors::{EventHubError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name for the user, falling back to the username when no
    /// first/last name is set
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

/// The authenticated actor issuing a request: a user together with the
/// role memberships resolved for them
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub roles: RoleSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: Option<bool>,
}

/// Validate a phone number against the accepted format: optional leading
/// `+`, 9 to 15 digits
pub fn validate_phone_number(phone: &str) -> Result<()> {
    // Same pattern the registration form enforces
    let pattern = regex::Regex::new(r"^\+?1?\d{9,15}$")
        .map_err(|e| EventHubError::Config(format!("Invalid phone regex: {}", e)))?;

    if pattern.is_match(phone) {
        Ok(())
    } else {
        Err(EventHubError::InvalidInput(
            "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed."
                .to_string(),
        ))
    }
}
