use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::a001_category::aggregate::slug_rule;
use crate::domain::common::compare::{cmp_date, cmp_opt, cmp_text};
use crate::domain::common::{Entity, RecordId, RecordMetadata};
use crate::shared::form::rules;
use crate::shared::form::{FieldSpec, FormSchema};
use crate::shared::list::{
    choice_matches, text_matches, FilterContext, FilterSpec, FilterValue, ListMode,
};

pub const ARTICLE_CATEGORIES: &[(&str, &str)] = &[
    ("farming_tips", "Farming tips"),
    ("market_news", "Market news"),
    ("government", "Government"),
    ("weather", "Weather"),
    ("technology", "Technology"),
];

pub const ARTICLE_STATUSES: &[(&str, &str)] = &[("published", "Published"), ("draft", "Draft")];

// ============================================================================
// Aggregate Root
// ============================================================================

/// Статья базы знаний для фермеров
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: RecordId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<NaiveDate>,
    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

impl Article {
    pub fn status(&self) -> &'static str {
        if self.is_published {
            "published"
        } else {
            "draft"
        }
    }
}

// ============================================================================
// Entity
// ============================================================================

impl Entity for Article {
    const INDEX: &'static str = "a002";
    const COLLECTION: &'static str = "articles";
    const ELEMENT_NAME: &'static str = "Article";
    const LIST_NAME: &'static str = "Articles";
    const LIST_MODE: ListMode = ListMode::Client;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches_filter(&self, key: &str, value: &FilterValue, _ctx: &FilterContext) -> bool {
        let query = value.as_str().unwrap_or("");
        match key {
            "search" => {
                let tags = self.tags.join(" ");
                text_matches(
                    query,
                    &[
                        &self.title,
                        self.author.as_deref().unwrap_or(""),
                        self.summary.as_deref().unwrap_or(""),
                        &tags,
                    ],
                )
            }
            "category" => choice_matches(query, &self.category),
            "status" => choice_matches(query, self.status()),
            _ => true,
        }
    }

    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "title" => cmp_text(&self.title, &other.title),
            "category" => cmp_text(&self.category, &other.category),
            "published_at" => cmp_date(self.published_at, other.published_at),
            "created_at" => cmp_opt(self.metadata.created_at, other.metadata.created_at),
            _ => Ordering::Equal,
        }
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("title", "Title")
                .required()
                .tab("General")
                .rule(rules::min_len(3, "Title must be at least 3 characters"))
                .rule(rules::max_len(200, "Title must be at most 200 characters")),
            FieldSpec::text("slug", "Slug").tab("General").rule(slug_rule()),
            FieldSpec::choice("category", "Category", ARTICLE_CATEGORIES)
                .required()
                .tab("General"),
            FieldSpec::text("author", "Author").tab("General"),
            FieldSpec::textarea("summary", "Summary")
                .tab("General")
                .rule(rules::max_len(500, "Summary must be at most 500 characters")),
            FieldSpec::textarea("content", "Content").required().tab("Content"),
            FieldSpec::tags("tags", "Tags")
                .tab("Content")
                .placeholder("paddy, irrigation"),
            FieldSpec::image("image_url", "Cover image", "articles").tab("Media"),
            FieldSpec::flag("is_published", "Published").tab("Publishing"),
            FieldSpec::date("published_at", "Publish date").tab("Publishing"),
        ])
    }

    fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("search", "Search"),
            FilterSpec::choice("category", "Category", ARTICLE_CATEGORIES),
            FilterSpec::choice("status", "Status", ARTICLE_STATUSES),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::list::FilterState;

    #[test]
    fn test_title_length_rule() {
        let schema = Article::form_schema();
        let field = schema.field("title").expect("title field");
        let mut values = schema.default_values();

        values.insert("title".into(), "Hi".into());
        assert_eq!(field.validate(&values), "Title must be at least 3 characters");

        values.insert("title".into(), "Hi!".into());
        assert_eq!(field.validate(&values), "");
    }

    #[test]
    fn test_tags_are_searchable() {
        let article = Article {
            title: "Monsoon preparation".into(),
            category: "weather".into(),
            tags: vec!["kharif".into(), "irrigation".into()],
            ..Default::default()
        };
        let ctx = FilterContext::default();
        let filters = FilterState::new()
            .with("search", FilterValue::text("IRRIG"))
            .with("category", FilterValue::choice("weather"))
            .with("status", FilterValue::choice("draft"));
        assert!(article.matches(&filters, &ctx));

        let published = FilterState::new().with("status", FilterValue::choice("published"));
        assert!(!article.matches(&published, &ctx));
    }

    #[test]
    fn test_payload_coercion_for_tags_and_dates() {
        let schema = Article::form_schema();
        let mut values = schema.default_values();
        values.insert("title".into(), "Soil testing".into());
        values.insert("category".into(), "technology".into());
        values.insert("content".into(), "Collect samples at 15 cm depth.".into());
        values.insert("tags".into(), "soil, testing".into());
        let payload = schema.to_payload(&values).expect("valid payload");
        assert_eq!(payload.get("tags"), Some(&serde_json::json!(["soil", "testing"])));
        assert_eq!(payload.get("published_at"), Some(&serde_json::Value::Null));

        let article: Article =
            serde_json::from_value(serde_json::Value::Object(payload)).expect("payload is an article");
        assert_eq!(article.tags, vec!["soil".to_string(), "testing".to_string()]);
        assert!(!article.is_published);
    }
}
