//! Test data builders
//!
//! Helpers for seeding users, events and categories, plus a recording
//! notification sink so the suites can assert on outgoing mail without an
//! SMTP server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;

use eventhub::config::Settings;
use eventhub::database::DatabaseService;
use eventhub::models::category::CreateCategoryRequest;
use eventhub::models::event::{CreateEventRequest, Event};
use eventhub::models::user::{CreateUserRequest, Principal};
use eventhub::services::{NotificationSink, ServiceFactory};
use eventhub::utils::errors::{EventHubError, Result};

/// Sink that records every message instead of delivering it; optionally
/// fails every send to exercise the best-effort delivery policy
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, String, String)>>,
    fail: bool,
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

/// Wire a service factory against the test database and a recording sink
pub fn test_services(db: DatabaseService) -> (ServiceFactory, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (test_services_with_sink(db, sink.clone()), sink)
}

/// Wire a service factory against an explicit sink
pub fn test_services_with_sink(db: DatabaseService, sink: Arc<RecordingSink>) -> ServiceFactory {
    let settings = Settings {
        auth: eventhub::config::AuthConfig {
            token_secret: "integration-test-secret".to_string(),
            activation_ttl_hours: 48,
            frontend_url: "https://eventhub.test".to_string(),
        },
        ..Settings::default()
    };
    ServiceFactory::with_sink(db, &settings, sink)
}

/// Create an active user holding the given role and resolve their principal
pub async fn seed_user(
    db: &DatabaseService,
    username: &str,
    role: Option<&str>,
) -> std::result::Result<Principal, EventHubError> {
    let user = db
        .users
        .create(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: Some(FirstName().fake()),
            last_name: Some(LastName().fake()),
            phone_number: Some("+999999999".to_string()),
        })
        .await?;
    let user = db.users.activate(user.id).await?;

    if let Some(role) = role {
        let group = db.groups.get_or_create(role).await?;
        db.groups.add_member(group.id, user.id).await?;
    }

    db.principal(user.id).await
}

pub async fn seed_category(
    db: &DatabaseService,
    name: &str,
) -> std::result::Result<i64, EventHubError> {
    let category = db
        .categories
        .create(CreateCategoryRequest {
            name: name.to_string(),
            description: None,
        })
        .await?;
    Ok(category.id)
}

pub async fn seed_event(
    db: &DatabaseService,
    name: &str,
    category_id: i64,
    starts_at: DateTime<Utc>,
) -> std::result::Result<Event, EventHubError> {
    db.events
        .create(CreateEventRequest {
            name: name.to_string(),
            description: "Seeded for integration tests".to_string(),
            image: None,
            starts_at,
            location: "Main Hall".to_string(),
            category_id,
        })
        .await
}

pub fn next_week() -> DateTime<Utc> {
    Utc::now() + Duration::days(7)
}

pub fn last_week() -> DateTime<Utc> {
    Utc::now() - Duration::days(7)
}
