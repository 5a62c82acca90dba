use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор записи: строковый (uuid) или числовой, как его отдаёт провайдер
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Новый строковый идентификатор (uuid v4)
    pub fn new_v4() -> Self {
        Self::Text(uuid::Uuid::new_v4().to_string())
    }

    /// Представление для URL и ключей хранилища
    pub fn as_string(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Разбор из сегмента пути: числа становятся `Number`, остальное `Text`
    pub fn from_string(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Empty record id".into());
        }
        Ok(trimmed
            .parse::<i64>()
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(trimmed.to_string())))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string_prefers_numbers() {
        assert_eq!(RecordId::from_string("42"), Ok(RecordId::Number(42)));
        assert_eq!(
            RecordId::from_string("a1b2"),
            Ok(RecordId::Text("a1b2".into()))
        );
        assert!(RecordId::from_string("  ").is_err());
    }

    #[test]
    fn test_untagged_serde() {
        let n: RecordId = serde_json::from_str("7").unwrap();
        assert_eq!(n, RecordId::Number(7));
        let s: RecordId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(s, RecordId::Text("abc".into()));
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"abc\"");
    }
}
