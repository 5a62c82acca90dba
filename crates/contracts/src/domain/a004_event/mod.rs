pub mod aggregate;

pub use aggregate::{Event, EVENT_STATUSES};
