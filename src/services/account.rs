//! Account service implementation
//!
//! Registration creates an inactive account and mails a signed activation
//! link; following the link activates the account, grants the Participant
//! role and routes the user to their dashboard. Token verification failures
//! all collapse into `InvalidActivationToken` so the activation page shows a
//! single message.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AuthConfig;
use crate::database::DatabaseService;
use crate::models::role::Role;
use crate::models::user::{validate_phone_number, CreateUserRequest, User};
use crate::services::access::{landing_for, Landing};
use crate::services::notification::NotificationService;
use crate::utils::errors::{EventHubError, Result};

/// Claims carried by an activation token
#[derive(Debug, Serialize, Deserialize)]
struct ActivationClaims {
    /// User id the token activates
    sub: i64,
    /// Expiry, seconds since the epoch
    exp: i64,
}

/// Sign an activation token for a user id
fn issue_activation_token(config: &AuthConfig, user_id: i64) -> Result<String> {
    let claims = ActivationClaims {
        sub: user_id,
        exp: (Utc::now() + Duration::hours(config.activation_ttl_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )
    .map_err(|e| EventHubError::Config(format!("Failed to sign activation token: {e}")))
}

/// Verify an activation token and return the user id it was issued for
fn verify_activation_token(config: &AuthConfig, token: &str) -> Result<i64> {
    let data = decode::<ActivationClaims>(
        token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| EventHubError::InvalidActivationToken)?;

    Ok(data.claims.sub)
}

/// Registration and activation flows
#[derive(Clone)]
pub struct AccountService {
    db: DatabaseService,
    notifications: NotificationService,
    config: AuthConfig,
}

impl AccountService {
    pub fn new(db: DatabaseService, notifications: NotificationService, config: AuthConfig) -> Self {
        Self { db, notifications, config }
    }

    /// Register a new account. The account starts inactive; the activation
    /// email is best-effort and never fails the registration.
    pub async fn register(&self, request: CreateUserRequest) -> Result<User> {
        if request.username.trim().is_empty() {
            return Err(EventHubError::InvalidInput("Username is required".to_string()));
        }
        if let Some(ref phone) = request.phone_number {
            if !phone.is_empty() {
                validate_phone_number(phone)?;
            }
        }

        if self.db.users.find_by_username(&request.username).await?.is_some() {
            return Err(EventHubError::InvalidInput(
                "A user with that username already exists.".to_string(),
            ));
        }

        let user = self.db.users.create(request).await?;
        info!(user_id = user.id, username = %user.username, "Registered new account");

        let token = issue_activation_token(&self.config, user.id)?;
        let activation_url = self.activation_url(user.id, &token);
        self.notifications.send_activation(&user, &activation_url).await;

        Ok(user)
    }

    /// Activate an account from an emailed token, attach the Participant
    /// role and route the user to their landing page.
    pub async fn activate(&self, token: &str) -> Result<(User, Landing)> {
        let user_id = verify_activation_token(&self.config, token)?;

        let user = self
            .db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(EventHubError::InvalidActivationToken)?;
        let user = if user.is_active {
            user
        } else {
            self.db.users.activate(user.id).await?
        };

        let participant = self.db.groups.get_or_create(Role::Participant.as_str()).await?;
        if !self.db.groups.is_member(user.id, Role::Participant.as_str()).await? {
            self.db.groups.add_member(participant.id, user.id).await?;
        }

        info!(user_id = user.id, "Account activated");

        let principal = self.db.principal(user.id).await?;
        Ok((user, landing_for(&principal.roles)))
    }

    fn activation_url(&self, user_id: i64, token: &str) -> String {
        format!(
            "{}/activate/{}/{}/",
            self.config.frontend_url.trim_end_matches('/'),
            user_id,
            token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn test_config() -> AuthConfig {
        AuthConfig {
            token_secret: "unit-test-secret".to_string(),
            activation_ttl_hours: 48,
            frontend_url: "https://example.org".to_string(),
        }
    }

    #[test]
    fn test_activation_token_round_trip() {
        let config = test_config();
        let token = issue_activation_token(&config, 42).unwrap();
        assert_eq!(verify_activation_token(&config, &token).unwrap(), 42);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = AuthConfig { activation_ttl_hours: -1, ..test_config() };
        let token = issue_activation_token(&config, 42).unwrap();
        let err = verify_activation_token(&config, &token).unwrap_err();
        assert_matches!(err, EventHubError::InvalidActivationToken);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let config = test_config();
        let token = issue_activation_token(&config, 42).unwrap();

        let other = AuthConfig { token_secret: "different-secret".to_string(), ..test_config() };
        let err = verify_activation_token(&other, &token).unwrap_err();
        assert_matches!(err, EventHubError::InvalidActivationToken);
    }
}
