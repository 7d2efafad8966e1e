//! Management service implementation
//!
//! Capability-gated wrappers around event, category and participant
//! administration. Listing events is open to everyone; mutation is gated per
//! the capability matrix, with event deletion restricted to Admins.

use chrono::Utc;

use crate::database::DatabaseService;
use crate::models::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::models::event::{CreateEventRequest, Event, EventFilter, UpdateEventRequest};
use crate::models::participant::Participant;
use crate::models::user::Principal;
use crate::services::access::{ensure, Capability};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::log_admin_action;

#[derive(Clone)]
pub struct ManagementService {
    db: DatabaseService,
}

impl ManagementService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    // Events

    /// Public event listing with search filters
    pub async fn search_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.db.events.search(filter).await
    }

    pub async fn event_detail(&self, event_id: i64) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(EventHubError::EventNotFound { event_id })
    }

    pub async fn create_event(
        &self,
        actor: &Principal,
        request: CreateEventRequest,
    ) -> Result<Event> {
        ensure(Some(actor), Capability::CreateEvent)?;

        if request.name.trim().is_empty() {
            return Err(EventHubError::InvalidInput("Event name is required".to_string()));
        }
        self.category_must_exist(request.category_id).await?;

        let event = self.db.events.create(request).await?;
        log_admin_action(actor.user.id, "create_event", Some(&event.name), None);
        Ok(event)
    }

    pub async fn update_event(
        &self,
        actor: &Principal,
        event_id: i64,
        request: UpdateEventRequest,
    ) -> Result<Event> {
        ensure(Some(actor), Capability::EditEvent)?;

        self.event_detail(event_id).await?;
        if let Some(category_id) = request.category_id {
            self.category_must_exist(category_id).await?;
        }

        let event = self.db.events.update(event_id, request).await?;
        log_admin_action(actor.user.id, "update_event", Some(&event.name), None);
        Ok(event)
    }

    pub async fn delete_event(&self, actor: &Principal, event_id: i64) -> Result<()> {
        ensure(Some(actor), Capability::DeleteEvent)?;

        let event = self.event_detail(event_id).await?;
        self.db.events.delete(event.id).await?;
        log_admin_action(actor.user.id, "delete_event", Some(&event.name), None);
        Ok(())
    }

    /// Dashboard data: upcoming and previous events plus aggregate counts
    pub async fn dashboard(
        &self,
        limit: i64,
    ) -> Result<(Vec<Event>, Vec<Event>, crate::models::event::DashboardCounts)> {
        self.db.event_overview(Utc::now(), limit).await
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.db.categories.list().await
    }

    pub async fn create_category(
        &self,
        actor: &Principal,
        request: CreateCategoryRequest,
    ) -> Result<Category> {
        ensure(Some(actor), Capability::CreateEvent)?;

        if request.name.trim().is_empty() {
            return Err(EventHubError::InvalidInput("Category name is required".to_string()));
        }

        let category = self.db.categories.create(request).await?;
        log_admin_action(actor.user.id, "create_category", Some(&category.name), None);
        Ok(category)
    }

    pub async fn update_category(
        &self,
        actor: &Principal,
        category_id: i64,
        request: UpdateCategoryRequest,
    ) -> Result<Category> {
        ensure(Some(actor), Capability::EditEvent)?;

        let category = self.db.categories.update(category_id, request).await?;
        log_admin_action(actor.user.id, "update_category", Some(&category.name), None);
        Ok(category)
    }

    pub async fn delete_category(&self, actor: &Principal, category_id: i64) -> Result<()> {
        ensure(Some(actor), Capability::DeleteEvent)?;

        self.db.categories.delete(category_id).await?;
        log_admin_action(actor.user.id, "delete_category", None, None);
        Ok(())
    }

    // Participants

    pub async fn participants_for_event(
        &self,
        actor: &Principal,
        event_id: i64,
    ) -> Result<Vec<Participant>> {
        ensure(Some(actor), Capability::ViewAllRsvps)?;
        self.db.participants.list_for_event(event_id).await
    }

    pub async fn list_participants(&self, actor: &Principal) -> Result<Vec<Participant>> {
        ensure(Some(actor), Capability::ViewAllRsvps)?;
        self.db.participants.list().await
    }

    pub async fn delete_participant(&self, actor: &Principal, participant_id: i64) -> Result<()> {
        ensure(Some(actor), Capability::DeleteAnyRsvp)?;

        self.db.participants.delete(participant_id).await?;
        log_admin_action(actor.user.id, "delete_participant", None, None);
        Ok(())
    }

    async fn category_must_exist(&self, category_id: i64) -> Result<()> {
        self.db
            .categories
            .find_by_id(category_id)
            .await?
            .map(|_| ())
            .ok_or(EventHubError::InvalidInput(format!("Unknown category: {category_id}")))
    }
}
