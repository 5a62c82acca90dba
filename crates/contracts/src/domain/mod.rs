pub mod common;

pub mod a001_category;
pub mod a002_article;
pub mod a003_coupon;
pub mod a004_event;
pub mod a005_farmer;
pub mod a006_crop;
pub mod a007_scheme;
