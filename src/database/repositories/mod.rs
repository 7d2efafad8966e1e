//! Database repositories module
//!
//! This module contains repository implementations for data access

pub mod category;
pub mod event;
pub mod group;
pub mod participant;
pub mod rsvp;
pub mod user;

pub use category::CategoryRepository;
pub use event::EventRepository;
pub use group::GroupRepository;
pub use participant::ParticipantRepository;
pub use rsvp::RsvpRepository;
pub use user::UserRepository;
