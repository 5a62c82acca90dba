//! Common types and traits for all entities

pub mod compare;
pub mod entity;
pub mod record_id;
pub mod record_metadata;
pub mod region;

// Re-exports
pub use entity::Entity;
pub use record_id::RecordId;
pub use record_metadata::RecordMetadata;
