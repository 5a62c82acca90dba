use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Текущая сортировка списка
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: String,
    pub ascending: bool,
}

impl SortState {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }

    /// Клик по заголовку: то же поле меняет направление, новое поле сортирует по возрастанию
    pub fn toggled(current: Option<&SortState>, field: &str) -> SortState {
        match current {
            Some(s) if s.field == field => SortState {
                field: s.field.clone(),
                ascending: !s.ascending,
            },
            _ => SortState::asc(field),
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

/// Индикатор сортировки для заголовка колонки
pub fn sort_indicator(current: Option<&SortState>, field: &str) -> &'static str {
    match current {
        Some(s) if s.field == field => {
            if s.ascending {
                " ▲"
            } else {
                " ▼"
            }
        }
        _ => " ⇅",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let first = SortState::toggled(None, "title");
        assert_eq!(first, SortState::asc("title"));
        let second = SortState::toggled(Some(&first), "title");
        assert_eq!(second, SortState::desc("title"));
        let other = SortState::toggled(Some(&second), "created_at");
        assert_eq!(other, SortState::asc("created_at"));
    }

    #[test]
    fn test_indicator() {
        let s = SortState::desc("title");
        assert_eq!(sort_indicator(Some(&s), "title"), " ▼");
        assert_eq!(sort_indicator(Some(&s), "code"), " ⇅");
    }
}
