//! Состояние фильтров списка и предикаты для сущностей

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Значение одного фильтра
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    /// Свободный текст (поиск)
    Text(String),
    /// Выбранное значение перечисления / справочника
    Choice(String),
    /// Диапазон дат, границы включительно
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

/// Значение выбора "все" эквивалентно отсутствию фильтра
pub const CHOICE_ALL: &str = "all";

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self::DateRange { from, to }
    }

    /// Пустой фильтр ничего не ограничивает
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Choice(s) => s.trim().is_empty() || s == CHOICE_ALL,
            Self::DateRange { from, to } => from.is_none() && to.is_none(),
        }
    }

    /// Строковое значение для текстовых фильтров и выбора
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s.trim()),
            Self::DateRange { .. } => None,
        }
    }

    /// Попадает ли дата в диапазон (для не-диапазонов всегда true)
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        match self {
            Self::DateRange { from, to } => {
                from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
            }
            _ => true,
        }
    }
}

/// Упорядоченный набор фильтров списка: ключ -> значение.
///
/// Пустое значение хранится как явное "снять фильтр" и при слиянии
/// затирает прежнее; сравнение учитывает только активные фильтры.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterState {
    values: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-вариант `set`
    pub fn with(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: FilterValue) {
        self.values.insert(key.into(), value);
    }

    /// Активное значение ключа
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key).filter(|v| !v.is_empty())
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Фильтры, которые реально ограничивают выборку
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// Слить изменённые ключи поверх текущих; пустые значения снимают фильтр
    pub fn merged(&self, changes: &FilterState) -> FilterState {
        let mut values: BTreeMap<String, FilterValue> = self
            .active()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        for (key, value) in &changes.values {
            if value.is_empty() {
                values.remove(key);
            } else {
                values.insert(key.clone(), value.clone());
            }
        }
        FilterState { values }
    }
}

impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        self.active().eq(other.active())
    }
}

/// Контекст вычисления предикатов (текущая дата для статусов "активен/истёк")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub today: NaiveDate,
}

impl FilterContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn now() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::now()
    }
}

/// Вид элемента управления фильтром
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Search,
    Choice(Vec<(&'static str, &'static str)>),
    DateRange,
}

/// Описание фильтра для панели фильтров и разбора query-параметров
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

impl FilterSpec {
    pub fn search(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FilterKind::Search,
        }
    }

    pub fn choice(
        key: &'static str,
        label: &'static str,
        options: &[(&'static str, &'static str)],
    ) -> Self {
        Self {
            key,
            label,
            kind: FilterKind::Choice(options.to_vec()),
        }
    }

    pub fn date_range(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FilterKind::DateRange,
        }
    }
}

/// Поиск подстроки без учета регистра по нескольким полям
pub fn text_matches(query: &str, fields: &[&str]) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    fields.iter().any(|f| f.to_lowercase().contains(&query))
}

/// Сравнение выбранного значения с полем без учета регистра
pub fn choice_matches(selected: &str, actual: &str) -> bool {
    selected.eq_ignore_ascii_case(actual.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_impose_no_constraint() {
        let mut state = FilterState::new();
        state.set("search", FilterValue::text("  "));
        state.set("status", FilterValue::choice(CHOICE_ALL));
        state.set("date", FilterValue::date_range(None, None));
        assert!(state.is_empty());
        assert_eq!(state, FilterState::new());
    }

    #[test]
    fn test_merge_overrides_and_removes() {
        let current = FilterState::new()
            .with("search", FilterValue::text("wheat"))
            .with("status", FilterValue::choice("active"));
        let changes = FilterState::new()
            .with("search", FilterValue::text(""))
            .with("season", FilterValue::choice("rabi"));

        let merged = current.merged(&changes);
        assert_eq!(merged.get("search"), None);
        assert_eq!(merged.get("status"), Some(&FilterValue::choice("active")));
        assert_eq!(merged.get("season"), Some(&FilterValue::choice("rabi")));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let from = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let range = FilterValue::date_range(Some(from), Some(to));
        assert!(range.contains_date(from));
        assert!(range.contains_date(to));
        assert!(!range.contains_date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
        let open = FilterValue::date_range(Some(from), None);
        assert!(open.contains_date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }

    #[test]
    fn test_text_matches_case_insensitive() {
        assert!(text_matches("PADDY", &["Paddy cultivation tips", ""]));
        assert!(text_matches("", &["anything"]));
        assert!(!text_matches("maize", &["Paddy", "Wheat"]));
    }
}
