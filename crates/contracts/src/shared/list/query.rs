//! Параметры запроса списка и ответ провайдера

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filter::{FilterKind, FilterSpec, FilterState, FilterValue};
use super::page::DEFAULT_PAGE_SIZE;
use super::sort::SortState;

const PARAM_PAGE: &str = "page";
const PARAM_PAGE_SIZE: &str = "page_size";
const PARAM_SORT_BY: &str = "sort_by";
const PARAM_SORT_DESC: &str = "sort_desc";

/// Верхняя граница размера страницы, которую принимает провайдер
pub const MAX_PAGE_SIZE: usize = 1000;

/// Запрос списка к провайдеру
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    pub filters: FilterState,
    pub page: usize,
    pub page_size: usize,
    pub sort: Option<SortState>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: FilterState::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl ListQuery {
    /// Запрос "всё сразу" для списков с фильтрацией на клиенте
    pub fn all(limit: usize) -> Self {
        Self {
            page_size: limit.clamp(1, MAX_PAGE_SIZE),
            ..Self::default()
        }
    }

    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1) * self.page_size
    }

    /// Плоские query-параметры: фильтры, диапазоны как `<key>_from` / `<key>_to`
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            (PARAM_PAGE.to_string(), self.page.to_string()),
            (PARAM_PAGE_SIZE.to_string(), self.page_size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            pairs.push((PARAM_SORT_BY.to_string(), sort.field.clone()));
            pairs.push((PARAM_SORT_DESC.to_string(), (!sort.ascending).to_string()));
        }
        for (key, value) in self.filters.active() {
            match value {
                FilterValue::Text(s) | FilterValue::Choice(s) => {
                    pairs.push((key.to_string(), s.trim().to_string()));
                }
                FilterValue::DateRange { from, to } => {
                    if let Some(from) = from {
                        pairs.push((format!("{}_from", key), from.format("%Y-%m-%d").to_string()));
                    }
                    if let Some(to) = to {
                        pairs.push((format!("{}_to", key), to.format("%Y-%m-%d").to_string()));
                    }
                }
            }
        }
        pairs
    }

    /// Разбор query-параметров по описанию фильтров сущности.
    ///
    /// Необъявленные ключи игнорируются, некорректные числа и даты
    /// заменяются значениями по умолчанию.
    pub fn from_query_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
        specs: &[FilterSpec],
    ) -> Self {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        let lookup = |name: &str| {
            pairs
                .iter()
                .rev()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| *v)
        };
        let parse_date = |name: &str| {
            lookup(name).and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
        };

        let page = lookup(PARAM_PAGE)
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let page_size = lookup(PARAM_PAGE_SIZE)
            .and_then(|v| v.parse::<usize>().ok())
            .map(|s| s.clamp(1, MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let sort = lookup(PARAM_SORT_BY)
            .filter(|f| !f.trim().is_empty())
            .map(|field| SortState {
                field: field.trim().to_string(),
                ascending: lookup(PARAM_SORT_DESC) != Some("true"),
            });

        let mut filters = FilterState::new();
        for spec in specs {
            let value = match spec.kind {
                FilterKind::Search => lookup(spec.key).map(FilterValue::text),
                FilterKind::Choice(_) => lookup(spec.key).map(FilterValue::choice),
                FilterKind::DateRange => {
                    let from = parse_date(&format!("{}_from", spec.key));
                    let to = parse_date(&format!("{}_to", spec.key));
                    Some(FilterValue::date_range(from, to))
                }
            };
            if let Some(value) = value {
                filters.set(spec.key, value);
            }
        }

        Self {
            filters,
            page,
            page_size,
            sort,
        }
    }
}

/// Ответ провайдера на запрос списка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::search("search", "Search"),
            FilterSpec::choice("status", "Status", &[("upcoming", "Upcoming")]),
            FilterSpec::date_range("event_date", "Date"),
        ]
    }

    #[test]
    fn test_pairs_round_trip() {
        let query = ListQuery {
            filters: FilterState::new()
                .with("search", FilterValue::text("mela"))
                .with("status", FilterValue::choice("upcoming"))
                .with(
                    "event_date",
                    FilterValue::date_range(NaiveDate::from_ymd_opt(2024, 3, 1), None),
                ),
            page: 2,
            page_size: 10,
            sort: Some(SortState::desc("event_date")),
        };
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("event_date_from".to_string(), "2024-03-01".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "event_date_to"));

        let decoded =
            ListQuery::from_query_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())), &specs());
        assert_eq!(decoded, query);
    }

    #[test]
    fn test_defaults_and_unknown_keys() {
        let decoded = ListQuery::from_query_pairs(
            [("page", "0"), ("page_size", "100000"), ("hack", "1")],
            &specs(),
        );
        assert_eq!(decoded.page, 1);
        assert_eq!(decoded.page_size, MAX_PAGE_SIZE);
        assert!(decoded.filters.is_empty());
        assert!(decoded.sort.is_none());
    }
}
