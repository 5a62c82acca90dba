use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::Bound;

use crate::domain::common::compare::{cmp_date, cmp_number, cmp_text};
use crate::domain::common::{Entity, RecordId, RecordMetadata};
use crate::shared::form::rules;
use crate::shared::form::{FieldSpec, FormSchema};
use crate::shared::list::{
    choice_matches, text_matches, FilterContext, FilterSpec, FilterValue, ListMode,
};

pub const COUPON_STATUSES: &[(&str, &str)] = &[
    ("active", "Active"),
    ("expired", "Expired"),
    ("inactive", "Inactive"),
];

/// Статус купона на дату
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponStatus {
    Active,
    Expired,
    Inactive,
}

impl CouponStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Inactive => "inactive",
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Купон на скидку в маркетплейсе
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coupon {
    pub id: RecordId,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub discount_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i64>,
    pub is_active: bool,
    #[serde(flatten)]
    pub metadata: RecordMetadata,
}

impl Coupon {
    /// Активен: включён и срок действия не истёк (`end_date >= today`)
    pub fn status(&self, today: NaiveDate) -> CouponStatus {
        if !self.is_active {
            return CouponStatus::Inactive;
        }
        match self.end_date {
            Some(end) if end < today => CouponStatus::Expired,
            _ => CouponStatus::Active,
        }
    }
}

// ============================================================================
// Entity
// ============================================================================

impl Entity for Coupon {
    const INDEX: &'static str = "a003";
    const COLLECTION: &'static str = "coupons";
    const ELEMENT_NAME: &'static str = "Coupon";
    const LIST_NAME: &'static str = "Coupons";
    const LIST_MODE: ListMode = ListMode::Client;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches_filter(&self, key: &str, value: &FilterValue, ctx: &FilterContext) -> bool {
        let query = value.as_str().unwrap_or("");
        match key {
            "search" => text_matches(
                query,
                &[&self.code, self.description.as_deref().unwrap_or("")],
            ),
            "status" => choice_matches(query, self.status(ctx.today).as_str()),
            _ => true,
        }
    }

    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "code" => cmp_text(&self.code, &other.code),
            "discount_percentage" => cmp_number(self.discount_percentage, other.discount_percentage),
            "end_date" => cmp_date(self.end_date, other.end_date),
            _ => Ordering::Equal,
        }
    }

    fn form_schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::text("code", "Code")
                .required()
                .placeholder("KHARIF25")
                .rule(rules::min_len(3, "Code must be at least 3 characters"))
                .rule(code_rule()),
            FieldSpec::textarea("description", "Description"),
            FieldSpec::decimal("discount_percentage", "Discount percentage")
                .required()
                .rule(rules::number_in(
                    Bound::Excluded(0.0),
                    Bound::Included(100.0),
                    "Discount percentage must be between 1 and 100",
                )),
            FieldSpec::decimal("max_discount_amount", "Max discount amount")
                .rule(rules::min_value(0.0, "Max discount amount cannot be negative")),
            FieldSpec::decimal("min_order_amount", "Min order amount")
                .rule(rules::min_value(0.0, "Min order amount cannot be negative")),
            FieldSpec::date("start_date", "Start date").required(),
            FieldSpec::date("end_date", "End date")
                .required()
                .rule(rules::after("start_date", "End date must be after start date")),
            FieldSpec::integer("usage_limit", "Usage limit")
                .rule(rules::min_value(1.0, "Usage limit must be at least 1")),
            FieldSpec::flag("is_active", "Active").default_value("true"),
        ])
    }

    fn filter_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("search", "Search"),
            FilterSpec::choice("status", "Status", COUPON_STATUSES),
        ]
    }
}

/// Код купона: заглавные латинские буквы и цифры
fn code_rule() -> crate::shared::form::ValidationRule {
    rules::custom("coupon_code", |_, value, _| {
        let ok = value
            .trim()
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        (!ok).then(|| "Code may contain only capital letters and digits".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::list::FilterState;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn coupon(code: &str, active: bool, end: NaiveDate) -> Coupon {
        Coupon {
            id: RecordId::from(code),
            code: code.into(),
            discount_percentage: 10.0,
            end_date: Some(end),
            is_active: active,
            ..Default::default()
        }
    }

    #[test]
    fn test_active_filter_uses_end_date_and_flag() {
        let today = date(2024, 6, 15);
        let ctx = FilterContext::new(today);
        let coupons = vec![
            coupon("FUTURE", true, date(2024, 7, 1)),
            coupon("LAST", true, today),
            coupon("PAST", true, date(2024, 6, 14)),
            coupon("OFF", false, date(2024, 7, 1)),
        ];
        let active = FilterState::new().with("status", FilterValue::choice("active"));
        let codes: Vec<&str> = coupons
            .iter()
            .filter(|c| c.matches(&active, &ctx))
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(codes, vec!["FUTURE", "LAST"]);

        assert_eq!(coupons[2].status(today), CouponStatus::Expired);
        assert_eq!(coupons[3].status(today), CouponStatus::Inactive);
    }

    #[test]
    fn test_percentage_boundaries() {
        let schema = Coupon::form_schema();
        let field = schema.field("discount_percentage").expect("field");
        let mut values = schema.default_values();
        for (raw, ok) in [("0", false), ("0.5", true), ("100", true), ("100.01", false), ("150", false)] {
            values.insert("discount_percentage".into(), raw.into());
            assert_eq!(field.validate(&values).is_empty(), ok, "value {}", raw);
        }
    }

    #[test]
    fn test_end_date_after_start_date() {
        let schema = Coupon::form_schema();
        let mut values = schema.default_values();
        values.insert("start_date".into(), "2024-06-10".into());
        values.insert("end_date".into(), "2024-06-01".into());
        let errors = schema.validate_values(&values);
        assert_eq!(
            errors.get("end_date").map(String::as_str),
            Some("End date must be after start date")
        );
    }
}
