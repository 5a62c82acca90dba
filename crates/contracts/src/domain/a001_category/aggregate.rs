use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::common::compare::{cmp_opt, cmp_text};
use crate::domain::common::{Entity, RecordId, RecordMetadata};
use crate::shared::form::rules;
use crate::shared::form::{FieldSpec, FormSchema};
use crate::shared::list::{
    choice_matches, text_matches, FilterContext, FilterSpec, FilterValue, ListMode,
};

pub const CATEGORY_STATUSES: &[(&str, &str)] = &[("active", "Active"), ("inactive", "Inactive")];

// ============================================================================
// Aggregate Root
// ============================================================================

/// Категория статей и товаров маркетплейса
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub display_order: i64,
    pub is_active: bool,
    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

impl Category {
    pub fn status(&self) -> &'static str {
        if self.is_active {
            "active"
        } else {
            "inactive"
        }
    }
}

// ============================================================================
// Entity
// ============================================================================

impl Entity for Category {
    const INDEX: &'static str = "a001";
    const COLLECTION: &'static str = "categories";
    const ELEMENT_NAME: &'static str = "Category";
    const LIST_NAME: &'static str = "Categories";
    const LIST_MODE: ListMode = ListMode::Client;

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
                    &self.slug,
                    self.description.as_deref().unwrap_or(""),
                ],
            ),
            "status" => choice_matches(query, self.status()),
            _ => true,
        }
    }

    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => cmp_text(&self.name, &other.name),
            "display_order" => self.display_order.cmp(&other.display_order),
            "created_at" => cmp_opt(self.metadata.created_at, other.metadata.created_at),
            _ => Ordering::Equal,
        }
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("name", "Name")
                .required()
                .rule(rules::min_len(2, "Name must be at least 2 characters"))
                .rule(rules::max_len(60, "Name must be at most 60 characters")),
            FieldSpec::text("slug", "Slug")
                .required()
                .placeholder("seeds-and-saplings")
                .rule(slug_rule()),
            FieldSpec::textarea("description", "Description"),
            FieldSpec::image("image_url", "Icon", "categories"),
            FieldSpec::integer("display_order", "Display order")
                .default_value("0")
                .rule(rules::min_value(0.0, "Display order cannot be negative")),
            FieldSpec::flag("is_active", "Active").default_value("true"),
        ])
    }

    fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("search", "Search"),
            FilterSpec::choice("status", "Status", CATEGORY_STATUSES),
        ]
    }
}

/// Строчные латинские буквы, цифры и дефисы
pub(crate) fn slug_rule() -> crate::shared::form::ValidationRule {
    rules::custom("slug", |_, value, _| {
        let ok = value
            .trim()
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        (!ok).then(|| "Slug may contain only lowercase letters, digits and dashes".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::list::FilterState;

    fn category(name: &str, active: bool) -> Category {
        Category {
            id: RecordId::new_v4(),
            name: name.into(),
            slug: name.to_lowercase().replace(' ', "-"),
            is_active: active,
            ..Default::default()
        }
    }

    #[test]
    fn test_status_and_search() {
        let ctx = FilterContext::default();
        let seeds = category("Seeds", true);
        let tools = category("Farm Tools", false);

        let inactive = FilterState::new().with("status", FilterValue::choice("inactive"));
        assert!(!seeds.matches(&inactive, &ctx));
        assert!(tools.matches(&inactive, &ctx));

        let search = FilterState::new().with("search", FilterValue::text("farm-t"));
        assert!(tools.matches(&search, &ctx));
        assert!(!seeds.matches(&search, &ctx));
    }

    #[test]
    fn test_slug_rule() {
        let schema = Category::form_schema();
        let mut values = schema.default_values();
        values.insert("name".into(), "Seeds".into());
        values.insert("slug".into(), "Seeds & Saplings".into());
        let errors = schema.validate_values(&values);
        assert!(errors.contains_key("slug"));

        values.insert("slug".into(), "seeds-and-saplings".into());
        assert!(schema.validate_values(&values).is_empty());
    }

    #[test]
    fn test_deserializes_partial_record() {
        let json = r#"{"id":"c1","name":"Seeds","is_active":true,"created_at":"2024-01-05T10:00:00Z"}"#;
        let category: Category = serde_json::from_str(json).expect("partial record");
        assert_eq!(category.id, RecordId::from("c1"));
        assert_eq!(category.display_order, 0);
        assert!(category.metadata.created_at.is_some());
    }
}
