pub mod form;
pub mod list;
pub mod provider;
pub mod storage;
