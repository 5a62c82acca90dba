use chrono::Utc;
use contracts::domain::a007_scheme::{Scheme, SCHEME_STATUSES};
use contracts::domain::common::region::state_label;
use leptos::prelude::*;

use crate::shared::record_list::{record_list_view, Cell, Column};

fn columns() -> Vec<Column<Scheme>> {
    vec![
        Column::new("name", "Name", |s: &Scheme| Cell::text(&s.name)),
        Column::new("ministry", "Ministry", |s: &Scheme| Cell::opt(s.ministry.as_ref())).unsortable(),
        Column::new("state", "State", |s: &Scheme| {
            Cell::text(s.state.as_deref().map(state_label).unwrap_or("All India"))
        })
        .unsortable(),
        Column::new("start_date", "Starts", |s: &Scheme| Cell::opt(s.start_date)),
        Column::new("end_date", "Ends", |s: &Scheme| Cell::opt(s.end_date)),
        Column::new("status", "Status", |s: &Scheme| {
            Cell::status(s.status(Utc::now().date_naive()), SCHEME_STATUSES)
        })
        .unsortable(),
    ]
}

#[component]
#[allow(non_snake_case)]
pub fn SchemeList() -> impl IntoView {
    record_list_view::<Scheme>(columns())
}
