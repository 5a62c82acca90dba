use contracts::domain::a005_farmer::{Farmer, VERIFICATION_STATUSES};
use contracts::domain::common::region::state_label;
use leptos::prelude::*;

use crate::shared::record_list::{record_list_view, Cell, Column};

fn columns() -> Vec<Column<Farmer>> {
    vec![
        Column::new("profile_image_url", "", |f: &Farmer| Cell::Image(f.profile_image_url.clone())).unsortable(),
        Column::new("name", "Name", |f: &Farmer| Cell::text(&f.name)),
        Column::new("phone", "Phone", |f: &Farmer| Cell::text(&f.phone)).unsortable(),
        Column::new("village", "Village", |f: &Farmer| Cell::opt(f.village.as_ref())).unsortable(),
        Column::new("state", "State", |f: &Farmer| Cell::text(state_label(&f.state))),
        Column::new("land_area_acres", "Land (acres)", |f: &Farmer| Cell::opt(f.land_area_acres)),
        Column::new("primary_crops", "Crops", |f: &Farmer| Cell::text(f.primary_crops.join(", "))).unsortable(),
        Column::new("is_verified", "Verification", |f: &Farmer| {
            Cell::status(if f.is_verified { "verified" } else { "unverified" }, VERIFICATION_STATUSES)
        })
        .unsortable(),
    ]
}

#[component]
#[allow(non_snake_case)]
pub fn FarmerList() -> impl IntoView {
    record_list_view::<Farmer>(columns())
}
