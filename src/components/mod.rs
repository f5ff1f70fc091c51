// Export components
pub mod caldav;
pub mod draft;
pub mod extractor;
pub mod ics;
pub mod pipeline;

pub use caldav::CalDavClient;
pub use draft::EventDraft;
pub use extractor::PageHandle;
pub use ics::{CalendarEvent, IcsEncoder};
