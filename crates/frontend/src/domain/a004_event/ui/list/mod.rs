use chrono::Utc;
use contracts::domain::a004_event::{Event, EVENT_STATUSES};
use leptos::prelude::*;

use crate::shared::record_list::{record_list_view, Cell, Column};

fn columns() -> Vec<Column<Event>> {
    vec![
        Column::new("image_url", "", |e: &Event| Cell::Image(e.image_url.clone())).unsortable(),
        Column::new("title", "Title", |e: &Event| Cell::text(&e.title)),
        Column::new("event_date", "Date", |e: &Event| Cell::opt(e.event_date)),
        Column::new("time", "Time", |e: &Event| Cell::text(format!("{} - {}", e.start_time, e.end_time)))
            .unsortable(),
        Column::new("location", "Location", |e: &Event| Cell::text(&e.location)),
        Column::new("status", "Status", |e: &Event| {
            Cell::status(e.status(Utc::now().date_naive()), EVENT_STATUSES)
        })
        .unsortable(),
    ]
}

#[component]
#[allow(non_snake_case)]
pub fn EventList() -> impl IntoView {
    record_list_view::<Event>(columns())
}
