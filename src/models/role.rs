//! Role and group models
//!
//! Roles are an open set of named groups with three core roles treated
//! specially: Admin, Organizer and Participant are compile-time variants,
//! protected from deletion, while custom groups remain runtime data.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;

/// Core roles recognized by the access policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Organizer,
    Participant,
}

impl Role {
    /// Names of the core role groups, protected from deletion
    pub const CORE_GROUP_NAMES: [&'static str; 3] = ["Admin", "Organizer", "Participant"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Organizer => "Organizer",
            Role::Participant => "Participant",
        }
    }

    /// Parse a group name into a core role, if it is one
    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "Admin" => Some(Role::Admin),
            "Organizer" => Some(Role::Organizer),
            "Participant" => Some(Role::Participant),
            _ => None,
        }
    }

    /// Whether a group name refers to one of the protected core groups
    pub fn is_core_group(name: &str) -> bool {
        Self::CORE_GROUP_NAMES.contains(&name)
    }
}

/// A named group row; backs both core roles and custom groups
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

/// The set of role memberships held by a principal
#[derive(Debug, Clone, Default)]
pub struct RoleSet {
    roles: HashSet<Role>,
    custom: Vec<String>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a role set from the principal's group names
    pub fn from_group_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = HashSet::new();
        let mut custom = Vec::new();

        for name in names {
            match Role::from_name(name.as_ref()) {
                Some(role) => {
                    roles.insert(role);
                }
                None => custom.push(name.as_ref().to_string()),
            }
        }

        Self { roles, custom }
    }

    pub fn has(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.has(*r))
    }

    /// True when the principal holds no role at all, core or custom
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.custom.is_empty()
    }

    pub fn custom_groups(&self) -> &[String] {
        &self.custom
    }
}
