use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::common::compare::{cmp_date, cmp_text};
use crate::domain::common::region::STATES;
use crate::domain::common::{Entity, RecordId, RecordMetadata};
use crate::shared::form::rules;
use crate::shared::form::{FieldSpec, FormSchema};
use crate::shared::list::{
    choice_matches, text_matches, FilterContext, FilterSpec, FilterValue, ListMode,
};

pub const SCHEME_STATUSES: &[(&str, &str)] = &[("active", "Active"), ("closed", "Closed")];

// ============================================================================
// Aggregate Root
// ============================================================================

/// Государственная программа поддержки фермеров
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scheme {
    pub id: RecordId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ministry: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eligibility: Option<String>,
    /// Пусто для общенациональных программ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
    pub is_active: bool,
    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

impl Scheme {
    /// Открыта: включена и срок подачи не закончился
    pub fn status(&self, today: NaiveDate) -> &'static str {
        let open = self.is_active && self.end_date.map_or(true, |end| end >= today);
        if open {
            "active"
        } else {
            "closed"
        }
    }
}

// ============================================================================
// Entity
// ============================================================================

impl Entity for Scheme {
    const INDEX: &'static str = "a007";
    const COLLECTION: &'static str = "schemes";
    const ELEMENT_NAME: &'static str = "Scheme";
    const LIST_NAME: &'static str = "Schemes";
    const LIST_MODE: ListMode = ListMode::Server;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches_filter(&self, key: &str, value: &FilterValue, ctx: &FilterContext) -> bool {
        let query = value.as_str().unwrap_or("");
        match key {
            "search" => text_matches(
                query,
                &[&self.name, self.ministry.as_deref().unwrap_or("")],
            ),
            "state" => choice_matches(query, self.state.as_deref().unwrap_or("")),
            "status" => choice_matches(query, self.status(ctx.today)),
            _ => true,
        }
    }

    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => cmp_text(&self.name, &other.name),
            "start_date" => cmp_date(self.start_date, other.start_date),
            "end_date" => cmp_date(self.end_date, other.end_date),
            _ => Ordering::Equal,
        }
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name")
                .required()
                .tab("Overview")
                .rule(rules::min_len(3, "Name must be at least 3 characters")),
            FieldSpec::text("ministry", "Ministry").tab("Overview"),
            FieldSpec::textarea("description", "Description").required().tab("Overview"),
            FieldSpec::textarea("benefits", "Benefits").tab("Details"),
            FieldSpec::textarea("eligibility", "Eligibility").tab("Details"),
            FieldSpec::choice("state", "State", STATES).tab("Details"),
            FieldSpec::date("start_date", "Start date").tab("Dates"),
            FieldSpec::date("end_date", "End date")
                .tab("Dates")
                .rule(rules::after("start_date", "End date must be after start date")),
            FieldSpec::url("application_url", "Application link").tab("Dates"),
            FieldSpec::flag("is_active", "Active").default_value("true").tab("Dates"),
        ])
    }

    fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("search", "Search"),
            FilterSpec::choice("state", "State", STATES),
            FilterSpec::choice("status", "Status", SCHEME_STATUSES),
        ]
    }
}
