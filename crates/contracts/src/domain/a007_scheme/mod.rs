pub mod aggregate;

pub use aggregate::{Scheme, SCHEME_STATUSES};
