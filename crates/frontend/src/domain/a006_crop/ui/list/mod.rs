use contracts::domain::a006_crop::{Crop, SEASONS, WATER_REQUIREMENTS};
use leptos::prelude::*;

use crate::shared::record_list::{record_list_view, Cell, Column};

fn label(options: &[(&'static str, &'static str)], code: &str) -> String {
    options
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, l)| l.to_string())
        .unwrap_or_else(|| code.to_string())
}

fn columns() -> Vec<Column<Crop>> {
    vec![
        Column::new("image_url", "", |c: &Crop| Cell::Image(c.image_url.clone())).unsortable(),
        Column::new("name", "Name", |c: &Crop| Cell::text(&c.name)),
        Column::new("local_name", "Local name", |c: &Crop| Cell::opt(c.local_name.as_ref())).unsortable(),
        Column::new("season", "Season", |c: &Crop| Cell::text(label(SEASONS, &c.season))),
        Column::new("duration_days", "Duration (days)", |c: &Crop| Cell::opt(c.duration_days)),
        Column::new("water_requirement", "Water", |c: &Crop| {
            Cell::opt(c.water_requirement.as_deref().map(|w| label(WATER_REQUIREMENTS, w)))
        })
        .unsortable(),
        Column::new("soil_types", "Soil", |c: &Crop| Cell::text(c.soil_types.join(", "))).unsortable(),
    ]
}

#[component]
#[allow(non_snake_case)]
pub fn CropList() -> impl IntoView {
    record_list_view::<Crop>(columns())
}
