//! Database service layer
//!
//! This module gathers the repositories behind a single handle

use crate::database::{
    CategoryRepository, DatabasePool, EventRepository, GroupRepository, ParticipantRepository,
    RsvpRepository, UserRepository,
};
use crate::models::*;
use crate::utils::errors::EventHubError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub groups: GroupRepository,
    pub events: EventRepository,
    pub rsvps: RsvpRepository,
    pub participants: ParticipantRepository,
    pub categories: CategoryRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            groups: GroupRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            rsvps: RsvpRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool),
        }
    }

    /// Resolve the calling principal for a request
    pub async fn principal(&self, user_id: i64) -> Result<Principal, EventHubError> {
        self.users
            .load_principal(user_id)
            .await?
            .ok_or(EventHubError::UserNotFound { user_id })
    }

    /// Home/dashboard listing data: upcoming and previous events plus counts
    pub async fn event_overview(
        &self,
        now: chrono::DateTime<chrono::Utc>,
        limit: i64,
    ) -> Result<(Vec<Event>, Vec<Event>, DashboardCounts), EventHubError> {
        let upcoming = self.events.list_upcoming(now, limit).await?;
        let previous = self.events.list_past(now, limit).await?;
        let counts = self.events.dashboard_counts(now).await?;

        Ok((upcoming, previous, counts))
    }
}
