use chrono::Utc;
use contracts::domain::a003_coupon::{Coupon, COUPON_STATUSES};
use leptos::prelude::*;

use crate::shared::record_list::{record_list_view, Cell, Column};

fn columns() -> Vec<Column<Coupon>> {
    vec![
        Column::new("code", "Code", |c: &Coupon| Cell::text(&c.code)),
        Column::new("discount_percentage", "Discount", |c: &Coupon| {
            Cell::text(format!("{}%", c.discount_percentage))
        }),
        Column::new("min_order_amount", "Min order", |c: &Coupon| {
            Cell::opt(c.min_order_amount.map(|v| format!("₹{:.2}", v)))
        })
        .unsortable(),
        Column::new("start_date", "Starts", |c: &Coupon| Cell::opt(c.start_date)).unsortable(),
        Column::new("end_date", "Ends", |c: &Coupon| Cell::opt(c.end_date)),
        Column::new("usage_limit", "Usage limit", |c: &Coupon| Cell::opt(c.usage_limit)).unsortable(),
        Column::new("status", "Status", |c: &Coupon| {
            Cell::status(c.status(Utc::now().date_naive()).as_str(), COUPON_STATUSES)
        })
        .unsortable(),
    ]
}

#[component]
#[allow(non_snake_case)]
pub fn CouponList() -> impl IntoView {
    record_list_view::<Coupon>(columns())
}
