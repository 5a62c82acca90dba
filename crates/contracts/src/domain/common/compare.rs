//! Сравнения для сортируемых колонок

use chrono::NaiveDate;
use std::cmp::Ordering;

/// Строки без учета регистра
pub fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

pub fn cmp_number(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Незаданные значения идут последними
pub fn cmp_opt<V: PartialOrd>(a: Option<V>, b: Option<V>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn cmp_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    cmp_opt(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_sort_last() {
        assert_eq!(cmp_opt(Some(1.0), None), Ordering::Less);
        assert_eq!(cmp_opt::<f64>(None, None), Ordering::Equal);
        assert_eq!(cmp_text("wheat", "Barley"), Ordering::Greater);
    }
}
