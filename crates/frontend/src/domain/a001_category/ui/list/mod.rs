use contracts::domain::a001_category::{Category, CATEGORY_STATUSES};
use leptos::prelude::*;

use crate::shared::record_list::{record_list_view, Cell, Column};

fn columns() -> Vec<Column<Category>> {
    vec![
        Column::new("image_url", "", |c: &Category| Cell::Image(c.image_url.clone())).unsortable(),
        Column::new("name", "Name", |c: &Category| Cell::text(&c.name)),
        Column::new("slug", "Slug", |c: &Category| Cell::text(&c.slug)).unsortable(),
        Column::new("display_order", "Order", |c: &Category| Cell::text(c.display_order.to_string())),
        Column::new("status", "Status", |c: &Category| Cell::status(c.status(), CATEGORY_STATUSES)).unsortable(),
    ]
}

#[component]
#[allow(non_snake_case)]
pub fn CategoryList() -> impl IntoView {
    record_list_view::<Category>(columns())
}
