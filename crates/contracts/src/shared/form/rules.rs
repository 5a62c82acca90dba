//! Правила валидации полей формы
//!
//! Правило - чистая функция `(имя поля, значение, вся форма) -> ошибка`.
//! Пустые значения правила не проверяют: за это отвечает флаг `required`.

use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

use super::schema::FormValues;

type RuleFn = dyn Fn(&str, &str, &FormValues) -> Option<String> + Send + Sync;

#[derive(Clone)]
pub struct ValidationRule {
    name: &'static str,
    dependency: Option<&'static str>,
    check: Arc<RuleFn>,
}

impl ValidationRule {
    pub fn new<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&str, &str, &FormValues) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name,
            dependency: None,
            check: Arc::new(check),
        }
    }

    /// Правило зависит от другого поля и перепроверяется при его изменении
    pub fn depending_on(mut self, field: &'static str) -> Self {
        self.dependency = Some(field);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn dependency(&self) -> Option<&'static str> {
        self.dependency
    }

    pub fn check(&self, field: &str, value: &str, form: &FormValues) -> Option<String> {
        (self.check)(field, value, form)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("dependency", &self.dependency)
            .finish()
    }
}

/// Минимальная длина в символах (без краевых пробелов)
pub fn min_len(min: usize, message: &'static str) -> ValidationRule {
    ValidationRule::new("min_len", move |_, value, _| {
        (value.trim().chars().count() < min).then(|| message.to_string())
    })
}

pub fn max_len(max: usize, message: &'static str) -> ValidationRule {
    ValidationRule::new("max_len", move |_, value, _| {
        (value.trim().chars().count() > max).then(|| message.to_string())
    })
}

/// Число в заданных границах. Нечисловой ввод отсекает проверка типа поля
pub fn number_in(lower: Bound<f64>, upper: Bound<f64>, message: &'static str) -> ValidationRule {
    ValidationRule::new("number_in", move |_, value, _| {
        let n = value.trim().parse::<f64>().ok()?;
        let above = match lower {
            Bound::Included(l) => n >= l,
            Bound::Excluded(l) => n > l,
            Bound::Unbounded => true,
        };
        let below = match upper {
            Bound::Included(u) => n <= u,
            Bound::Excluded(u) => n < u,
            Bound::Unbounded => true,
        };
        (!(above && below)).then(|| message.to_string())
    })
}

pub fn min_value(min: f64, message: &'static str) -> ValidationRule {
    number_in(Bound::Included(min), Bound::Unbounded, message)
}

/// Ровно `count` цифр (пробелы и дефисы игнорируются)
pub fn digits(count: usize, message: &'static str) -> ValidationRule {
    ValidationRule::new("digits", move |_, value, _| {
        let cleaned: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        let ok = cleaned.len() == count && cleaned.chars().all(|c| c.is_ascii_digit());
        (!ok).then(|| message.to_string())
    })
}

/// Значение должно быть строго позже значения поля `other` (даты или время)
pub fn after(other: &'static str, message: &'static str) -> ValidationRule {
    ValidationRule::new("after", move |_, value, form| {
        let other_value = form.get(other).map(|s| s.trim()).unwrap_or("");
        if other_value.is_empty() {
            return None;
        }
        let later = match compare_temporal(value.trim(), other_value) {
            Some(ordering) => ordering.is_gt(),
            None => return None,
        };
        (!later).then(|| message.to_string())
    })
    .depending_on(other)
}

/// Произвольное правило
pub fn custom<F>(name: &'static str, check: F) -> ValidationRule
where
    F: Fn(&str, &str, &FormValues) -> Option<String> + Send + Sync + 'static,
{
    ValidationRule::new(name, check)
}

fn compare_temporal(a: &str, b: &str) -> Option<std::cmp::Ordering> {
    if let (Ok(a), Ok(b)) = (
        NaiveDate::parse_from_str(a, "%Y-%m-%d"),
        NaiveDate::parse_from_str(b, "%Y-%m-%d"),
    ) {
        return Some(a.cmp(&b));
    }
    match (parse_time(a), parse_time(b)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => None,
    }
}

pub(crate) fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}
