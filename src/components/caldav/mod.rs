mod client;
pub mod models;

pub use client::{basic_auth, collection_url, event_url, CalDavClient};
pub use models::CreatedEvent;
