//! iCalendar (RFC 5545) encoding of single events.

mod encoder;
pub mod models;
pub mod text;

pub use encoder::{generate_uid, IcsEncoder, DEFAULT_PRODUCT_ID};
pub use models::{CalendarEvent, LineEnding};
