//! Access policy implementation
//!
//! This service gates every management and RSVP-administrative operation by
//! role membership, routes principals to their dashboard, and carries the
//! role-management operations themselves (assign roles, manage groups,
//! delete accounts) with the guards around core groups and superusers.

use tracing::info;

use crate::database::{GroupRepository, UserRepository};
use crate::models::role::{Role, RoleSet};
use crate::models::user::Principal;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::{log_access_decision, log_admin_action};

/// Operations a caller may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewOwnRsvps,
    ToggleOwnRsvp,
    CreateEvent,
    EditEvent,
    DeleteEvent,
    ViewAllRsvps,
    DeleteAnyRsvp,
    ManageRoles,
}

impl Capability {
    /// Whether a role set grants this capability. Viewing and toggling one's
    /// own RSVPs only requires being signed in, so any role set qualifies;
    /// everything else follows the capability matrix.
    pub fn allowed_for(&self, roles: &RoleSet) -> bool {
        match self {
            Capability::ViewOwnRsvps | Capability::ToggleOwnRsvp => true,
            Capability::CreateEvent | Capability::EditEvent => {
                roles.has_any(&[Role::Admin, Role::Organizer])
            }
            Capability::DeleteEvent => roles.has(Role::Admin),
            Capability::ViewAllRsvps | Capability::DeleteAnyRsvp => {
                roles.has_any(&[Role::Admin, Role::Organizer])
            }
            Capability::ManageRoles => roles.has(Role::Admin),
        }
    }

    /// User-visible message for a denied attempt
    pub fn denied_message(&self) -> &'static str {
        match self {
            Capability::ViewOwnRsvps | Capability::ToggleOwnRsvp => "Please sign in to continue.",
            Capability::CreateEvent | Capability::EditEvent => {
                "Admin or Organizer privileges required."
            }
            Capability::DeleteEvent => "Admin privileges required.",
            Capability::ViewAllRsvps | Capability::DeleteAnyRsvp => {
                "Admin or Organizer privileges required."
            }
            Capability::ManageRoles => "Admin privileges required.",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Capability::ViewOwnRsvps => "view_own_rsvps",
            Capability::ToggleOwnRsvp => "toggle_own_rsvp",
            Capability::CreateEvent => "create_event",
            Capability::EditEvent => "edit_event",
            Capability::DeleteEvent => "delete_event",
            Capability::ViewAllRsvps => "view_all_rsvps",
            Capability::DeleteAnyRsvp => "delete_any_rsvp",
            Capability::ManageRoles => "manage_roles",
        }
    }
}

/// Where a principal lands after sign-in or a denied operation. Denials are
/// redirect decisions with a user-visible message, never hard faults at the
/// presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    AdminDashboard,
    OrganizerDashboard,
    ParticipantDashboard,
    SignIn { message: String },
}

/// Route a signed-in principal to the dashboard matching their highest role
pub fn landing_for(roles: &RoleSet) -> Landing {
    if roles.has(Role::Admin) {
        Landing::AdminDashboard
    } else if roles.has(Role::Organizer) {
        Landing::OrganizerDashboard
    } else if roles.has(Role::Participant) {
        Landing::ParticipantDashboard
    } else {
        Landing::SignIn {
            message: "No role assigned. Please contact the administrator.".to_string(),
        }
    }
}

/// Check a capability for an optionally-authenticated caller, returning the
/// principal on success
pub fn ensure<'p>(
    principal: Option<&'p Principal>,
    capability: Capability,
) -> Result<&'p Principal> {
    match principal {
        None => {
            log_access_decision(None, capability.name(), false);
            Err(EventHubError::AccessDenied(
                "Please sign in to continue.".to_string(),
            ))
        }
        Some(p) => {
            let allowed = capability.allowed_for(&p.roles);
            log_access_decision(Some(p.user.id), capability.name(), allowed);
            if allowed {
                Ok(p)
            } else {
                Err(EventHubError::AccessDenied(
                    capability.denied_message().to_string(),
                ))
            }
        }
    }
}

/// Role management operations, Admin-gated
#[derive(Debug, Clone)]
pub struct AccessService {
    users: UserRepository,
    groups: GroupRepository,
}

impl AccessService {
    pub fn new(users: UserRepository, groups: GroupRepository) -> Self {
        Self { users, groups }
    }

    /// Replace a user's role memberships with a single named role
    pub async fn assign_role(
        &self,
        actor: &Principal,
        user_id: i64,
        role_name: &str,
    ) -> Result<()> {
        ensure(Some(actor), Capability::ManageRoles)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(EventHubError::UserNotFound { user_id })?;

        let group = self.groups.get_or_create(role_name).await?;
        self.groups.clear_memberships(user.id).await?;
        self.groups.add_member(group.id, user.id).await?;

        log_admin_action(actor.user.id, "assign_role", Some(&user.username), Some(role_name));
        Ok(())
    }

    /// Create a custom named group
    pub async fn create_group(&self, actor: &Principal, name: &str) -> Result<()> {
        ensure(Some(actor), Capability::ManageRoles)?;

        if name.trim().is_empty() {
            return Err(EventHubError::InvalidInput("Group name is required".to_string()));
        }

        self.groups.create(name).await?;
        log_admin_action(actor.user.id, "create_group", Some(name), None);
        Ok(())
    }

    /// Delete a custom group. The three core groups are protected even from
    /// Admins.
    pub async fn delete_group(&self, actor: &Principal, group_id: i64) -> Result<()> {
        ensure(Some(actor), Capability::ManageRoles)?;

        let group = self
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or(EventHubError::GroupNotFound { group_id })?;

        if Role::is_core_group(&group.name) {
            return Err(EventHubError::CoreGroupProtected(group.name));
        }

        self.groups.delete(group.id).await?;
        log_admin_action(actor.user.id, "delete_group", Some(&group.name), None);
        Ok(())
    }

    /// Delete a user account. Self-deletion and superuser deletion are
    /// blocked.
    pub async fn delete_user(&self, actor: &Principal, user_id: i64) -> Result<()> {
        ensure(Some(actor), Capability::ManageRoles)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(EventHubError::UserNotFound { user_id })?;

        if user.id == actor.user.id {
            return Err(EventHubError::CannotDeleteSelf);
        }
        if user.is_superuser {
            return Err(EventHubError::CannotDeleteSuperuser);
        }

        self.users.delete(user.id).await?;
        log_admin_action(actor.user.id, "delete_user", Some(&user.username), None);
        Ok(())
    }

    /// Ensure the core groups exist, give Admin to every superuser and
    /// Participant to every user without a role
    pub async fn bootstrap_roles(&self) -> Result<()> {
        for name in Role::CORE_GROUP_NAMES {
            self.groups.get_or_create(name).await?;
        }

        let admin = self
            .groups
            .find_by_name(Role::Admin.as_str())
            .await?
            .ok_or(EventHubError::Config("Admin group missing after bootstrap".to_string()))?;
        for user in self.users.list_superusers().await? {
            if !self.groups.is_member(user.id, Role::Admin.as_str()).await? {
                self.groups.add_member(admin.id, user.id).await?;
                info!(user_id = user.id, "Assigned Admin role to superuser");
            }
        }

        let participant = self
            .groups
            .find_by_name(Role::Participant.as_str())
            .await?
            .ok_or(EventHubError::Config("Participant group missing after bootstrap".to_string()))?;
        for user in self.users.list_without_groups().await? {
            self.groups.add_member(participant.id, user.id).await?;
            info!(user_id = user.id, "Assigned Participant role to user");
        }

        info!("RBAC bootstrap completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn principal_with(groups: &[&str]) -> Principal {
        Principal {
            user: User {
                id: 1,
                username: "tester".to_string(),
                email: "tester@example.com".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                phone_number: String::new(),
                is_active: true,
                is_superuser: false,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            roles: RoleSet::from_group_names(groups.iter().copied()),
        }
    }

    const ALL_CAPABILITIES: [Capability; 8] = [
        Capability::ViewOwnRsvps,
        Capability::ToggleOwnRsvp,
        Capability::CreateEvent,
        Capability::EditEvent,
        Capability::DeleteEvent,
        Capability::ViewAllRsvps,
        Capability::DeleteAnyRsvp,
        Capability::ManageRoles,
    ];

    #[test]
    fn test_admin_allows_everything() {
        let admin = principal_with(&["Admin"]);
        for cap in ALL_CAPABILITIES {
            assert!(cap.allowed_for(&admin.roles), "{:?}", cap);
        }
    }

    #[test]
    fn test_organizer_matrix() {
        let organizer = principal_with(&["Organizer"]);
        assert!(Capability::ViewOwnRsvps.allowed_for(&organizer.roles));
        assert!(Capability::ToggleOwnRsvp.allowed_for(&organizer.roles));
        assert!(Capability::CreateEvent.allowed_for(&organizer.roles));
        assert!(Capability::EditEvent.allowed_for(&organizer.roles));
        assert!(Capability::ViewAllRsvps.allowed_for(&organizer.roles));
        assert!(Capability::DeleteAnyRsvp.allowed_for(&organizer.roles));
        assert!(!Capability::DeleteEvent.allowed_for(&organizer.roles));
        assert!(!Capability::ManageRoles.allowed_for(&organizer.roles));
    }

    #[test]
    fn test_participant_matrix() {
        let participant = principal_with(&["Participant"]);
        assert!(Capability::ViewOwnRsvps.allowed_for(&participant.roles));
        assert!(Capability::ToggleOwnRsvp.allowed_for(&participant.roles));
        for cap in [
            Capability::CreateEvent,
            Capability::EditEvent,
            Capability::DeleteEvent,
            Capability::ViewAllRsvps,
            Capability::DeleteAnyRsvp,
            Capability::ManageRoles,
        ] {
            assert!(!cap.allowed_for(&participant.roles), "{:?}", cap);
        }
    }

    #[test]
    fn test_anonymous_denied_with_sign_in_message() {
        for cap in ALL_CAPABILITIES {
            let err = ensure(None, cap).unwrap_err();
            assert_matches!(err, EventHubError::AccessDenied(msg) => {
                assert_eq!(msg, "Please sign in to continue.");
            });
        }
    }

    #[test]
    fn test_denied_operation_carries_message() {
        let participant = principal_with(&["Participant"]);
        let err = ensure(Some(&participant), Capability::DeleteEvent).unwrap_err();
        assert_matches!(err, EventHubError::AccessDenied(msg) => {
            assert_eq!(msg, "Admin privileges required.");
        });
    }

    #[test]
    fn test_landing_routes_by_highest_role() {
        assert_eq!(landing_for(&principal_with(&["Admin"]).roles), Landing::AdminDashboard);
        assert_eq!(
            landing_for(&principal_with(&["Organizer", "Participant"]).roles),
            Landing::OrganizerDashboard
        );
        assert_eq!(
            landing_for(&principal_with(&["Participant"]).roles),
            Landing::ParticipantDashboard
        );
        assert_matches!(
            landing_for(&principal_with(&["Admin", "Organizer"]).roles),
            Landing::AdminDashboard
        );
    }

    #[test]
    fn test_no_role_lands_on_sign_in() {
        let landing = landing_for(&principal_with(&[]).roles);
        assert_matches!(landing, Landing::SignIn { message } => {
            assert_eq!(message, "No role assigned. Please contact the administrator.");
        });
    }

    #[test]
    fn test_custom_group_grants_no_dashboard() {
        let custom = principal_with(&["Volunteers"]);
        assert_matches!(landing_for(&custom.roles), Landing::SignIn { .. });
        assert!(!Capability::CreateEvent.allowed_for(&custom.roles));
    }
}
