pub mod aggregate;

pub use aggregate::{Category, CATEGORY_STATUSES};
