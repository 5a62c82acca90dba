use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Служебные поля записи, которые выставляет провайдер
///
/// В форму не попадают; при создании отсутствуют.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecordMetadata {
    /// Метаданные новой записи
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Обновить timestamp
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
