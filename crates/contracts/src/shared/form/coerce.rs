//! Проверка формата и приведение сырых значений к типам сущности

use chrono::NaiveDate;
use serde_json::{Number, Value};

use super::rules::parse_time;
use super::schema::FieldKind;

impl FieldKind {
    /// Проверка формата непустого значения
    pub fn check(&self, label: &str, raw: &str) -> Option<String> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        let ok = match self {
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Decimal => parse_decimal(value).is_some(),
            Self::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            Self::Time => parse_time(value).is_some(),
            Self::Flag => value == "true" || value == "false",
            Self::Choice(options) => options.iter().any(|(v, _)| *v == value),
            Self::Url | Self::Image { .. } => {
                value.starts_with("http://") || value.starts_with("https://") || value.starts_with('/')
            }
            Self::Text | Self::TextArea | Self::Tags => true,
        };
        if ok {
            return None;
        }
        Some(match self {
            Self::Integer => format!("{} must be a whole number", label),
            Self::Decimal => format!("{} must be a number", label),
            Self::Date => format!("{} must be a valid date (YYYY-MM-DD)", label),
            Self::Time => format!("{} must be a valid time (HH:MM)", label),
            Self::Choice(_) => format!("{} has an unknown value", label),
            Self::Url | Self::Image { .. } => format!("{} must be a valid URL", label),
            _ => format!("{} is invalid", label),
        })
    }

    /// Сырое значение -> JSON для payload.
    ///
    /// Пустая строка означает "не задано": null, для флагов false, для тегов пустой массив.
    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(match self {
                Self::Flag => Value::Bool(false),
                Self::Tags => Value::Array(Vec::new()),
                _ => Value::Null,
            });
        }
        match self {
            Self::Text | Self::TextArea => Ok(Value::String(raw.to_string())),
            Self::Date | Self::Time | Self::Choice(_) | Self::Url | Self::Image { .. } => {
                Ok(Value::String(value.to_string()))
            }
            Self::Integer => value
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| e.to_string()),
            Self::Decimal => parse_decimal(value)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("not a number: {}", value)),
            Self::Flag => Ok(Value::Bool(value == "true")),
            Self::Tags => Ok(Value::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| Value::String(t.to_string()))
                    .collect(),
            )),
        }
    }

    /// JSON-значение записи -> строка для поля ввода
    pub fn to_raw(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => match self {
                Self::Flag => "false".to_string(),
                _ => String::new(),
            },
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            Some(other @ Value::Object(_)) => other.to_string(),
        }
    }
}

fn parse_decimal(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}
