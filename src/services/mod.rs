//! Services module
//!
//! This module contains the business-logic services built on top of the
//! repository layer

pub mod access;
pub mod account;
pub mod management;
pub mod notification;
pub mod rsvp;

pub use access::{ensure, landing_for, AccessService, Capability, Landing};
pub use account::AccountService;
pub use management::ManagementService;
pub use notification::{NotificationService, NotificationSink, SmtpNotifier};
pub use rsvp::{plan_toggle, RemovedRsvp, RsvpOutcome, RsvpService, ToggleAction};

use std::sync::Arc;

use crate::config::Settings;
use crate::database::DatabaseService;

/// Factory wiring every service against one database handle and one
/// notification sink
#[derive(Clone)]
pub struct ServiceFactory {
    pub notifications: NotificationService,
    pub rsvps: RsvpService,
    pub access: AccessService,
    pub accounts: AccountService,
    pub management: ManagementService,
}

impl ServiceFactory {
    pub fn new(db: DatabaseService, settings: &Settings) -> Self {
        let sink = Arc::new(SmtpNotifier::new(settings.mail.clone()));
        Self::with_sink(db, settings, sink)
    }

    /// Build the factory with an explicit sink; tests substitute a recording
    /// fake here
    pub fn with_sink(
        db: DatabaseService,
        settings: &Settings,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let notifications = NotificationService::new(sink);

        Self {
            notifications: notifications.clone(),
            rsvps: RsvpService::new(db.clone(), notifications.clone()),
            access: AccessService::new(db.users.clone(), db.groups.clone()),
            accounts: AccountService::new(db.clone(), notifications, settings.auth.clone()),
            management: ManagementService::new(db),
        }
    }
}
