pub mod aggregate;

pub use aggregate::{Farmer, VERIFICATION_STATUSES};
