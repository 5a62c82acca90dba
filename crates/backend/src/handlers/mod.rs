pub mod records;
pub mod storage;
