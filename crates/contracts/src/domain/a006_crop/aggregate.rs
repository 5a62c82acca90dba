use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::common::compare::{cmp_opt, cmp_text};
use crate::domain::common::{Entity, RecordId, RecordMetadata};
use crate::shared::form::rules;
use crate::shared::form::{FieldSpec, FormSchema};
use crate::shared::list::{
    choice_matches, text_matches, FilterContext, FilterSpec, FilterValue, ListMode,
};

pub const SEASONS: &[(&str, &str)] = &[("kharif", "Kharif"), ("rabi", "Rabi"), ("zaid", "Zaid")];

pub const WATER_REQUIREMENTS: &[(&str, &str)] =
    &[("low", "Low"), ("medium", "Medium"), ("high", "High")];

// ============================================================================
// Aggregate Root
// ============================================================================

/// Культура из справочника
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Crop {
    pub id: RecordId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    pub season: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_requirement: Option<String>,
    pub soil_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

// ============================================================================
// Entity
// ============================================================================

impl Entity for Crop {
    const INDEX: &'static str = "a006";
    const COLLECTION: &'static str = "crops";
    const ELEMENT_NAME: &'static str = "Crop";
    const LIST_NAME: &'static str = "Crops";
    const LIST_MODE: ListMode = ListMode::Server;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches_filter(&self, key: &str, value: &FilterValue, _ctx: &FilterContext) -> bool {
        let query = value.as_str().unwrap_or("");
        match key {
            "search" => text_matches(
                query,
                &[&self.name, self.local_name.as_deref().unwrap_or("")],
            ),
            "season" => choice_matches(query, &self.season),
            _ => true,
        }
    }

    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => cmp_text(&self.name, &other.name),
            "season" => cmp_text(&self.season, &other.season),
            "duration_days" => cmp_opt(self.duration_days, other.duration_days),
            _ => Ordering::Equal,
        }
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::text("local_name", "Local name").placeholder("Dhaan"),
            FieldSpec::choice("season", "Season", SEASONS).required(),
            FieldSpec::integer("duration_days", "Duration (days)")
                .rule(rules::number_in(
                    std::ops::Bound::Included(1.0),
                    std::ops::Bound::Included(730.0),
                    "Duration must be between 1 and 730 days",
                )),
            FieldSpec::choice("water_requirement", "Water requirement", WATER_REQUIREMENTS),
            FieldSpec::tags("soil_types", "Soil types").placeholder("loamy, clay"),
            FieldSpec::textarea("description", "Description"),
            FieldSpec::image("image_url", "Image", "crops"),
        ])
    }

    fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("search", "Search"),
            FilterSpec::choice("season", "Season", SEASONS),
        ]
    }
}
