use uuid::Uuid;

pub mod article;
pub mod event;
pub mod participation;
pub mod user;

pub use article::Article;
pub use event::{Event, EventRow, Location, NewEvent};
pub use participation::{EventCapacity, NewParticipation, Participation};
pub use user::{NewUser, UserProfile, UserRow, UserType};

/// Opaque, prefixed identifier such as `event_3f2c…`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
