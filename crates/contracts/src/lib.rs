//! Shared contracts of the Baykart admin dashboard.
//!
//! Compiled both into the wasm frontend and the native backend:
//! entity aggregates, the list/form core and the provider boundary.

pub mod domain;
pub mod shared;
pub mod system;
