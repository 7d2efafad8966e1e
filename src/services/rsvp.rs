//! RSVP engine implementation
//!
//! The toggle operation is split in two: `plan_toggle` is a pure function
//! over the event and the locked RSVP rows that decides which transition
//! applies, and `RsvpService::toggle` executes that decision inside a single
//! transaction. The partial unique index on confirmed rows backstops the
//! in-transaction check, so a concurrent loser surfaces as
//! `EventAlreadyReserved` instead of a duplicate confirmation.

use chrono::{DateTime, Utc};

use crate::database::DatabaseService;
use crate::models::event::Event;
use crate::models::rsvp::{Rsvp, RsvpStatus, RsvpSummary};
use crate::models::user::{Principal, User};
use crate::services::access::{ensure, Capability};
use crate::services::notification::NotificationService;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::log_rsvp_action;

/// Name of the partial unique index enforcing one confirmed RSVP per event
const CONFIRMED_UNIQUE_INDEX: &str = "rsvps_one_confirmed_per_event";

/// The transition the planner selected for a toggle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// Move to confirmed status, inserting a fresh row when `create` is set
    Confirm { create: bool },
    /// Move the caller's confirmed row to cancelled
    Cancel,
}

/// What a completed toggle did, carrying the resulting row
#[derive(Debug, Clone)]
pub enum RsvpOutcome {
    /// First confirmation for this user and event
    Confirmed(Rsvp),
    /// An earlier cancelled row was flipped back to confirmed
    Reconfirmed(Rsvp),
    /// The caller's confirmed row was cancelled
    Cancelled(Rsvp),
}

impl RsvpOutcome {
    pub fn rsvp(&self) -> &Rsvp {
        match self {
            RsvpOutcome::Confirmed(r) | RsvpOutcome::Reconfirmed(r) | RsvpOutcome::Cancelled(r) => r,
        }
    }

    fn action_name(&self) -> &'static str {
        match self {
            RsvpOutcome::Confirmed(_) => "confirmed",
            RsvpOutcome::Reconfirmed(_) => "reconfirmed",
            RsvpOutcome::Cancelled(_) => "cancelled",
        }
    }
}

/// An administratively removed RSVP
#[derive(Debug, Clone)]
pub struct RemovedRsvp {
    pub rsvp: Rsvp,
    pub owner: Option<User>,
}

/// Decide which transition a toggle call performs.
///
/// `confirmed` is the event's current confirmed row (if any) and `own` is the
/// caller's row (if any), both taken from the locked row set. Past events
/// reject the call outright, and a confirmed row held by someone else blocks
/// a new confirmation without affecting that holder's own ability to cancel.
pub fn plan_toggle(
    event: &Event,
    caller_id: i64,
    confirmed: Option<&Rsvp>,
    own: Option<&Rsvp>,
    now: DateTime<Utc>,
) -> Result<ToggleAction> {
    if event.is_past(now) {
        return Err(EventHubError::PastEvent { event_id: event.id });
    }

    match own {
        Some(mine) if mine.is_confirmed() => Ok(ToggleAction::Cancel),
        _ => {
            if confirmed.map(|c| c.user_id != caller_id).unwrap_or(false) {
                return Err(EventHubError::EventAlreadyReserved { event_id: event.id });
            }
            Ok(ToggleAction::Confirm { create: own.is_none() })
        }
    }
}

/// RSVP lifecycle service
#[derive(Clone)]
pub struct RsvpService {
    db: DatabaseService,
    notifications: NotificationService,
}

impl RsvpService {
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// Flip the caller's RSVP for an event: confirm when free, cancel when
    /// they hold the confirmation. All writes run in one transaction; the
    /// confirmation or cancellation email goes out only after commit.
    pub async fn toggle(&self, caller: &Principal, event_id: i64) -> Result<RsvpOutcome> {
        ensure(Some(caller), Capability::ToggleOwnRsvp)?;
        let user = &caller.user;

        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(EventHubError::EventNotFound { event_id })?;

        let mut tx = self.db.rsvps.pool().begin().await?;

        let locked = self.db.rsvps.lock_for_event(&mut tx, event_id).await?;
        let confirmed = locked.iter().find(|r| r.is_confirmed());
        let own = locked.iter().find(|r| r.user_id == user.id);

        let action = plan_toggle(&event, user.id, confirmed, own, Utc::now())?;

        let outcome = match action {
            ToggleAction::Confirm { create } => {
                let rsvp = if create {
                    self.db
                        .rsvps
                        .insert(&mut tx, user.id, event_id, RsvpStatus::Confirmed)
                        .await
                } else {
                    // own is always present when create is false
                    let mine = own.ok_or(EventHubError::RsvpNotFound { rsvp_id: 0 })?;
                    self.db.rsvps.set_status(&mut tx, mine.id, RsvpStatus::Confirmed).await
                }
                .map_err(|e| map_confirmed_conflict(e, event_id))?;

                let participant = self
                    .db
                    .participants
                    .get_or_create(&mut tx, &user.full_name(), &user.email)
                    .await?;
                self.db.participants.link_event(&mut tx, participant.id, event_id).await?;

                if create {
                    RsvpOutcome::Confirmed(rsvp)
                } else {
                    RsvpOutcome::Reconfirmed(rsvp)
                }
            }
            ToggleAction::Cancel => {
                // plan_toggle only returns Cancel when the caller's row exists
                let mine = own.ok_or(EventHubError::RsvpNotFound { rsvp_id: 0 })?;
                let rsvp = self.db.rsvps.set_status(&mut tx, mine.id, RsvpStatus::Cancelled).await?;
                self.db
                    .participants
                    .unlink_event_by_identity(&mut tx, &user.full_name(), &user.email, event_id)
                    .await?;

                RsvpOutcome::Cancelled(rsvp)
            }
        };

        tx.commit().await.map_err(|e| map_confirmed_conflict(e.into(), event_id))?;

        log_rsvp_action(user.id, event_id, outcome.action_name(), None);
        self.notify(user, &event, &outcome).await;

        Ok(outcome)
    }

    /// Administrative removal of an RSVP row, Admin/Organizer only. The
    /// past-event rule does not apply; this is historical cleanup.
    pub async fn remove(&self, actor: &Principal, rsvp_id: i64) -> Result<RemovedRsvp> {
        ensure(Some(actor), Capability::DeleteAnyRsvp)?;

        let rsvp = self
            .db
            .rsvps
            .find_by_id(rsvp_id)
            .await?
            .ok_or(EventHubError::RsvpNotFound { rsvp_id })?;
        let owner = self.db.users.find_by_id(rsvp.user_id).await?;

        let mut tx = self.db.rsvps.pool().begin().await?;
        self.db.rsvps.delete(&mut tx, rsvp.id).await?;
        if let Some(ref owner) = owner {
            self.db
                .participants
                .unlink_event_by_identity(&mut tx, &owner.full_name(), &owner.email, rsvp.event_id)
                .await?;
        }
        tx.commit().await?;

        log_rsvp_action(actor.user.id, rsvp.event_id, "removed", Some("admin removal"));
        Ok(RemovedRsvp { rsvp, owner })
    }

    /// The caller's own RSVPs, optionally filtered by status
    pub async fn rsvps_for_user(
        &self,
        caller: &Principal,
        status: Option<RsvpStatus>,
    ) -> Result<Vec<Rsvp>> {
        ensure(Some(caller), Capability::ViewOwnRsvps)?;
        self.db.rsvps.list_for_user(caller.user.id, status).await
    }

    /// All RSVPs for one event, Admin/Organizer only
    pub async fn rsvps_for_event(&self, actor: &Principal, event_id: i64) -> Result<Vec<Rsvp>> {
        ensure(Some(actor), Capability::ViewAllRsvps)?;
        self.db.rsvps.list_for_event(event_id).await
    }

    /// System-wide RSVP listing with tallies, Admin/Organizer only
    pub async fn all_rsvps(&self, actor: &Principal) -> Result<(Vec<Rsvp>, RsvpSummary)> {
        ensure(Some(actor), Capability::ViewAllRsvps)?;
        let rsvps = self.db.rsvps.list_all().await?;
        let summary = self.db.rsvps.summary().await?;
        Ok((rsvps, summary))
    }

    /// The user currently holding the confirmed RSVP for an event
    pub async fn confirmed_holder(&self, event_id: i64) -> Result<Option<User>> {
        let Some(rsvp) = self.db.rsvps.find_confirmed_for_event(event_id).await? else {
            return Ok(None);
        };
        self.db.users.find_by_id(rsvp.user_id).await
    }

    async fn notify(&self, user: &User, event: &Event, outcome: &RsvpOutcome) {
        match outcome {
            RsvpOutcome::Confirmed(_) | RsvpOutcome::Reconfirmed(_) => {
                let category_name = match self.db.categories.find_by_id(event.category_id).await {
                    Ok(Some(category)) => category.name,
                    _ => "Uncategorized".to_string(),
                };
                self.notifications
                    .send_rsvp_confirmation(user, event, &category_name)
                    .await;
            }
            RsvpOutcome::Cancelled(_) => {
                self.notifications.send_rsvp_cancellation(user, event).await;
            }
        }
    }
}

/// Map a unique violation on the confirmed-RSVP index to the domain error
fn map_confirmed_conflict(err: EventHubError, event_id: i64) -> EventHubError {
    if let EventHubError::Database(sqlx::Error::Database(ref db)) = err {
        if db.constraint() == Some(CONFIRMED_UNIQUE_INDEX) {
            return EventHubError::EventAlreadyReserved { event_id };
        }
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use proptest::prelude::*;

    fn upcoming_event() -> Event {
        Event {
            id: 7,
            name: "Tech Talk".to_string(),
            description: "An evening talk".to_string(),
            image: "event_images/default.jpg".to_string(),
            starts_at: Utc::now() + Duration::days(7),
            location: "Main Hall".to_string(),
            category_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rsvp(id: i64, user_id: i64, status: RsvpStatus) -> Rsvp {
        Rsvp {
            id,
            user_id,
            event_id: 7,
            status: status.as_str().to_string(),
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_toggle_creates_confirmation() {
        let action = plan_toggle(&upcoming_event(), 1, None, None, Utc::now()).unwrap();
        assert_eq!(action, ToggleAction::Confirm { create: true });
    }

    #[test]
    fn test_toggle_on_own_confirmation_cancels() {
        let mine = rsvp(10, 1, RsvpStatus::Confirmed);
        let action =
            plan_toggle(&upcoming_event(), 1, Some(&mine), Some(&mine), Utc::now()).unwrap();
        assert_eq!(action, ToggleAction::Cancel);
    }

    #[test]
    fn test_toggle_on_own_cancellation_reconfirms() {
        let mine = rsvp(10, 1, RsvpStatus::Cancelled);
        let action = plan_toggle(&upcoming_event(), 1, None, Some(&mine), Utc::now()).unwrap();
        assert_eq!(action, ToggleAction::Confirm { create: false });
    }

    #[test]
    fn test_pending_row_is_promoted_to_confirmed() {
        let mine = rsvp(10, 1, RsvpStatus::Pending);
        let action = plan_toggle(&upcoming_event(), 1, None, Some(&mine), Utc::now()).unwrap();
        assert_eq!(action, ToggleAction::Confirm { create: false });
    }

    #[test]
    fn test_second_user_is_rejected_while_event_is_reserved() {
        let theirs = rsvp(10, 1, RsvpStatus::Confirmed);
        let err = plan_toggle(&upcoming_event(), 2, Some(&theirs), None, Utc::now()).unwrap_err();
        assert_matches!(err, EventHubError::EventAlreadyReserved { event_id: 7 });
    }

    #[test]
    fn test_second_user_with_old_cancellation_is_still_rejected() {
        let theirs = rsvp(10, 1, RsvpStatus::Confirmed);
        let mine = rsvp(11, 2, RsvpStatus::Cancelled);
        let err = plan_toggle(&upcoming_event(), 2, Some(&theirs), Some(&mine), Utc::now())
            .unwrap_err();
        assert_matches!(err, EventHubError::EventAlreadyReserved { .. });
    }

    #[test]
    fn test_past_event_rejects_all_toggles() {
        let mut event = upcoming_event();
        event.starts_at = Utc::now() - Duration::hours(1);

        let err = plan_toggle(&event, 1, None, None, Utc::now()).unwrap_err();
        assert_matches!(err, EventHubError::PastEvent { event_id: 7 });

        // Even the confirmation holder cannot cancel once the event started
        let mine = rsvp(10, 1, RsvpStatus::Confirmed);
        let err = plan_toggle(&event, 1, Some(&mine), Some(&mine), Utc::now()).unwrap_err();
        assert_matches!(err, EventHubError::PastEvent { .. });
    }

    proptest! {
        /// Alternating toggles by one user never need more than the single
        /// row: the first creates, every later confirm reuses it, and the
        /// status strictly alternates confirmed/cancelled.
        #[test]
        fn test_toggle_alternation_reuses_single_row(toggles in 1usize..20) {
            let event = upcoming_event();
            let mut own: Option<Rsvp> = None;
            let mut created_rows = 0usize;

            for i in 0..toggles {
                let confirmed = own.as_ref().filter(|r| r.is_confirmed());
                let action =
                    plan_toggle(&event, 1, confirmed, own.as_ref(), Utc::now()).unwrap();

                match action {
                    ToggleAction::Confirm { create } => {
                        prop_assert_eq!(create, own.is_none());
                        if create {
                            created_rows += 1;
                            own = Some(rsvp(10, 1, RsvpStatus::Confirmed));
                        } else {
                            own.as_mut().unwrap().status =
                                RsvpStatus::Confirmed.as_str().to_string();
                        }
                        prop_assert_eq!(i % 2, 0);
                    }
                    ToggleAction::Cancel => {
                        own.as_mut().unwrap().status =
                            RsvpStatus::Cancelled.as_str().to_string();
                        prop_assert_eq!(i % 2, 1);
                    }
                }
            }

            prop_assert_eq!(created_rows, 1);
            let final_confirmed = own.unwrap().is_confirmed();
            prop_assert_eq!(final_confirmed, toggles % 2 == 1);
        }
    }
}
