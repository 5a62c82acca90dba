pub mod aggregate;

pub use aggregate::{Coupon, CouponStatus, COUPON_STATUSES};
