use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::common::compare::{cmp_opt, cmp_text};
use crate::domain::common::region::STATES;
use crate::domain::common::{Entity, RecordId, RecordMetadata};
use crate::shared::form::rules;
use crate::shared::form::{FieldSpec, FormSchema};
use crate::shared::list::{
    choice_matches, text_matches, FilterContext, FilterSpec, FilterValue, ListMode,
};

pub const VERIFICATION_STATUSES: &[(&str, &str)] =
    &[("verified", "Verified"), ("unverified", "Not verified")];

// ============================================================================
// Aggregate Root
// ============================================================================

/// Зарегистрированный фермер
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Farmer {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_area_acres: Option<f64>,
    pub primary_crops: Vec<String>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

// ============================================================================
// Entity
// ============================================================================

impl Entity for Farmer {
    const INDEX: &'static str = "a005";
    const COLLECTION: &'static str = "farmers";
    const ELEMENT_NAME: &'static str = "Farmer";
    const LIST_NAME: &'static str = "Farmers";
    const LIST_MODE: ListMode = ListMode::Server;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches_filter(&self, key: &str, value: &FilterValue, _ctx: &FilterContext) -> bool {
        let query = value.as_str().unwrap_or("");
        match key {
            "search" => text_matches(
                query,
                &[
                    &self.name,
                    &self.phone,
                    self.village.as_deref().unwrap_or(""),
                    self.district.as_deref().unwrap_or(""),
                ],
            ),
            "state" => choice_matches(query, &self.state),
            "verified" => {
                let status = if self.is_verified { "verified" } else { "unverified" };
                choice_matches(query, status)
            }
            _ => true,
        }
    }

    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => cmp_text(&self.name, &other.name),
            "state" => cmp_text(&self.state, &other.state),
            "land_area_acres" => cmp_opt(self.land_area_acres, other.land_area_acres),
            "created_at" => cmp_opt(self.metadata.created_at, other.metadata.created_at),
            _ => Ordering::Equal,
        }
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name")
                .required()
                .tab("Personal")
                .rule(rules::min_len(2, "Name must be at least 2 characters")),
            FieldSpec::text("phone", "Phone")
                .required()
                .tab("Personal")
                .placeholder("9876543210")
                .rule(rules::digits(10, "Phone number must be 10 digits")),
            FieldSpec::text("email", "Email").tab("Personal").rule(email_rule()),
            FieldSpec::image("profile_image_url", "Photo", "farmers").tab("Personal"),
            FieldSpec::text("village", "Village").tab("Location"),
            FieldSpec::text("district", "District").tab("Location"),
            FieldSpec::choice("state", "State", STATES).required().tab("Location"),
            FieldSpec::decimal("land_area_acres", "Land area (acres)")
                .tab("Farm")
                .rule(rules::min_value(0.0, "Land area cannot be negative")),
            FieldSpec::tags("primary_crops", "Primary crops").tab("Farm"),
            FieldSpec::flag("is_verified", "Verified").tab("Farm"),
        ])
    }

    fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("search", "Search"),
            FilterSpec::choice("state", "State", STATES),
            FilterSpec::choice("verified", "Verification", VERIFICATION_STATUSES),
        ]
    }
}

fn email_rule() -> crate::shared::form::ValidationRule {
    rules::custom("email", |_, value, _| {
        let value = value.trim();
        let ok = match value.split_once('@') {
            Some((user, domain)) => !user.is_empty() && domain.contains('.') && !domain.ends_with('.'),
            None => false,
        };
        (!ok).then(|| "Enter a valid email address".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_values() -> crate::shared::form::FormValues {
        let schema = Farmer::form_schema();
        let mut values = schema.default_values();
        values.insert("name".into(), "Ramesh Patil".into());
        values.insert("phone".into(), "98765 43210".into());
        values.insert("state".into(), "maharashtra".into());
        values
    }

    #[test]
    fn test_optional_land_area_is_null_not_zero() {
        let schema = Farmer::form_schema();
        let values = valid_values();
        assert!(schema.validate_values(&values).is_empty());
        let payload = schema.to_payload(&values).expect("payload");
        assert_eq!(payload.get("land_area_acres"), Some(&serde_json::Value::Null));
        assert_eq!(payload.get("is_verified"), Some(&serde_json::json!(false)));
    }

    #[test]
    fn test_phone_and_land_area_rules() {
        let schema = Farmer::form_schema();
        let mut values = valid_values();
        values.insert("phone".into(), "12345".into());
        values.insert("land_area_acres".into(), "-2".into());
        values.insert("email".into(), "ramesh@".into());
        let errors = schema.validate_values(&values);
        assert_eq!(
            errors.get("phone").map(String::as_str),
            Some("Phone number must be 10 digits")
        );
        assert_eq!(
            errors.get("land_area_acres").map(String::as_str),
            Some("Land area cannot be negative")
        );
        assert!(errors.contains_key("email"));
    }
}
