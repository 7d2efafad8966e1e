//! Event and category management integration tests

mod helpers;

use assert_matches::assert_matches;
use chrono::Duration;

use eventhub::models::event::{CreateEventRequest, EventFilter, UpdateEventRequest};
use eventhub::models::role::Role;
use eventhub::utils::errors::EventHubError;
use helpers::database_helper::TestDatabase;
use helpers::test_data::{next_week, last_week, seed_category, seed_event, seed_user, test_services};

fn event_request(name: &str, category_id: i64) -> CreateEventRequest {
    CreateEventRequest {
        name: name.to_string(),
        description: "Created through the management surface".to_string(),
        image: None,
        starts_at: next_week(),
        location: "Main Hall".to_string(),
        category_id,
    }
}

#[tokio::test]
async fn test_event_crud_follows_capability_matrix() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = test_db.service();
    let (services, _sink) = test_services(db.clone());

    let admin = seed_user(&db, "root", Some(Role::Admin.as_str())).await.unwrap();
    let organizer = seed_user(&db, "planner", Some(Role::Organizer.as_str())).await.unwrap();
    let member = seed_user(&db, "member", Some(Role::Participant.as_str())).await.unwrap();

    let category_id = seed_category(&db, "Technology").await.unwrap();

    // Participants cannot create
    let err = services
        .management
        .create_event(&member, event_request("Tech Talk", category_id))
        .await
        .unwrap_err();
    assert_matches!(err, EventHubError::AccessDenied(_));

    // Organizers create and edit
    let event = services
        .management
        .create_event(&organizer, event_request("Tech Talk", category_id))
        .await
        .unwrap();
    let event = services
        .management
        .update_event(
            &organizer,
            event.id,
            UpdateEventRequest {
                location: Some("Auditorium".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(event.location, "Auditorium");

    // Deletion is Admin-only
    let err = services.management.delete_event(&organizer, event.id).await.unwrap_err();
    assert_matches!(err, EventHubError::AccessDenied(msg) => {
        assert_eq!(msg, "Admin privileges required.");
    });
    services.management.delete_event(&admin, event.id).await.unwrap();

    let err = services.management.event_detail(event.id).await.unwrap_err();
    assert_matches!(err, EventHubError::EventNotFound { .. });
}

#[tokio::test]
async fn test_event_requires_known_category() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = test_db.service();
    let (services, _sink) = test_services(db.clone());

    let organizer = seed_user(&db, "planner", Some(Role::Organizer.as_str())).await.unwrap();

    let err = services
        .management
        .create_event(&organizer, event_request("Tech Talk", 999))
        .await
        .unwrap_err();
    assert_matches!(err, EventHubError::InvalidInput(_));
}

#[tokio::test]
async fn test_search_filters_events() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = test_db.service();
    let (services, _sink) = test_services(db.clone());

    let tech = seed_category(&db, "Technology").await.unwrap();
    let music = seed_category(&db, "Music").await.unwrap();
    seed_event(&db, "Tech Talk", tech, next_week()).await.unwrap();
    seed_event(&db, "Jazz Night", music, next_week()).await.unwrap();
    seed_event(&db, "Old Jam", music, last_week()).await.unwrap();

    let by_text = services
        .management
        .search_events(&EventFilter { search: Some("jazz".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].name, "Jazz Night");

    let by_category = services
        .management
        .search_events(&EventFilter { category_id: Some(music), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(by_category.len(), 2);

    let upcoming = services
        .management
        .search_events(&EventFilter {
            starts_after: Some(chrono::Utc::now() - Duration::hours(1)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(upcoming.len(), 2);
}

#[tokio::test]
async fn test_dashboard_counts() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = test_db.service();
    let (services, _sink) = test_services(db.clone());

    let tech = seed_category(&db, "Technology").await.unwrap();
    seed_event(&db, "Tech Talk", tech, next_week()).await.unwrap();
    seed_event(&db, "Old Jam", tech, last_week()).await.unwrap();

    let (upcoming, previous, counts) = services.management.dashboard(10).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(previous.len(), 1);
    assert_eq!(counts.total_events, 2);
    assert_eq!(counts.upcoming_events, 1);
    assert_eq!(counts.past_events, 1);
    assert_eq!(counts.total_categories, 1);
}
