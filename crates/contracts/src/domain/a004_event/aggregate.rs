use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::common::compare::{cmp_date, cmp_text};
use crate::domain::common::{Entity, RecordId, RecordMetadata};
use crate::shared::form::rules;
use crate::shared::form::{FieldSpec, FormSchema};
use crate::shared::list::{
    choice_matches, text_matches, FilterContext, FilterSpec, FilterValue, ListMode,
};

pub const EVENT_STATUSES: &[(&str, &str)] = &[("upcoming", "Upcoming"), ("past", "Past")];

// ============================================================================
// Aggregate Root
// ============================================================================

/// Мероприятие: выставка, обучение, семинар для фермеров
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: RecordId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    /// `HH:MM`
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_url: Option<String>,
    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

impl Event {
    /// Мероприятие сегодня или позже считается предстоящим
    pub fn status(&self, today: NaiveDate) -> &'static str {
        match self.event_date {
            Some(date) if date < today => "past",
            _ => "upcoming",
        }
    }
}

// ============================================================================
// Entity
// ============================================================================

impl Entity for Event {
    const INDEX: &'static str = "a004";
    const COLLECTION: &'static str = "events";
    const ELEMENT_NAME: &'static str = "Event";
    const LIST_NAME: &'static str = "Events";
    const LIST_MODE: ListMode = ListMode::Server;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches_filter(&self, key: &str, value: &FilterValue, ctx: &FilterContext) -> bool {
        match key {
            "search" => text_matches(
                value.as_str().unwrap_or(""),
                &[
                    &self.title,
                    &self.location,
                    self.organizer.as_deref().unwrap_or(""),
                ],
            ),
            "event_date" => self
                .event_date
                .map_or(false, |date| value.contains_date(date)),
            "status" => choice_matches(value.as_str().unwrap_or(""), self.status(ctx.today)),
            _ => true,
        }
    }

    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "title" => cmp_text(&self.title, &other.title),
            "event_date" => cmp_date(self.event_date, other.event_date)
                .then_with(|| self.start_time.cmp(&other.start_time)),
            "location" => cmp_text(&self.location, &other.location),
            _ => Ordering::Equal,
        }
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title")
                .required()
                .tab("Details")
                .rule(rules::min_len(3, "Title must be at least 3 characters")),
            FieldSpec::textarea("description", "Description").tab("Details"),
            FieldSpec::text("organizer", "Organizer").tab("Details"),
            FieldSpec::date("event_date", "Event date").required().tab("Schedule"),
            FieldSpec::time("start_time", "Start time").required().tab("Schedule"),
            FieldSpec::time("end_time", "End time")
                .required()
                .tab("Schedule")
                .rule(rules::after("start_time", "End time must be after start time")),
            FieldSpec::text("location", "Location").required().tab("Schedule"),
            FieldSpec::integer("max_attendees", "Max attendees")
                .tab("Registration")
                .rule(rules::min_value(1.0, "Max attendees must be at least 1")),
            FieldSpec::url("registration_url", "Registration link").tab("Registration"),
            FieldSpec::image("image_url", "Banner", "events").tab("Media"),
        ])
    }

    fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("search", "Search"),
            FilterSpec::date_range("event_date", "Event date"),
            FilterSpec::choice("status", "Status", EVENT_STATUSES),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::list::FilterState;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_end_time_must_follow_start_time() {
        let schema = Event::form_schema();
        let field = schema.field("end_time").expect("end_time");
        let mut values = schema.default_values();
        values.insert("start_time".into(), "14:00".into());
        values.insert("end_time".into(), "13:00".into());
        assert_eq!(field.validate(&values), "End time must be after start time");

        values.insert("end_time".into(), "15:30".into());
        assert_eq!(field.validate(&values), "");
        assert_eq!(schema.dependents_of("start_time").collect::<Vec<_>>(), vec!["end_time"]);
    }

    #[test]
    fn test_date_range_and_status() {
        let ctx = FilterContext::new(date(2024, 6, 15));
        let event = Event {
            title: "Kisan Mela".into(),
            location: "Ludhiana".into(),
            event_date: Some(date(2024, 6, 20)),
            start_time: "10:00".into(),
            end_time: "17:00".into(),
            ..Default::default()
        };

        let june = FilterState::new().with(
            "event_date",
            FilterValue::date_range(Some(date(2024, 6, 1)), Some(date(2024, 6, 20))),
        );
        assert!(event.matches(&june, &ctx));

        let july = FilterState::new().with(
            "event_date",
            FilterValue::date_range(Some(date(2024, 7, 1)), None),
        );
        assert!(!event.matches(&july, &ctx));

        assert_eq!(event.status(ctx.today), "upcoming");
        assert_eq!(event.status(date(2024, 6, 21)), "past");
    }
}
