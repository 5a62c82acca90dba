pub mod field_input;
pub mod filter_bar;
pub mod pagination_controls;
