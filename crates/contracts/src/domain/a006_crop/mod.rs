pub mod aggregate;

pub use aggregate::{Crop, SEASONS, WATER_REQUIREMENTS};
