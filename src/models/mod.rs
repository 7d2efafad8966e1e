//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod category;
pub mod event;
pub mod participant;
pub mod role;
pub mod rsvp;
pub mod user;

// Re-export commonly used models
pub use category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
pub use event::{CreateEventRequest, DashboardCounts, Event, EventFilter, UpdateEventRequest};
pub use participant::{CreateParticipantRequest, Participant};
pub use role::{Group, Role, RoleSet};
pub use rsvp::{Rsvp, RsvpStatus, RsvpSummary};
pub use user::{CreateUserRequest, Principal, UpdateUserRequest, User};
