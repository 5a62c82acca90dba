//! Граница с внешним провайдером данных (REST API / BaaS)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::common::{Entity, RecordId};
use crate::shared::list::{ListQuery, ListResponse};

#[cfg(test)]
pub(crate) mod memory;

/// Ошибки по полям: имя поля -> сообщение
pub type FieldErrors = BTreeMap<String, String>;

/// Частичная запись для create/update
pub type Payload = Map<String, Value>;

/// Ошибка вызова провайдера
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Session expired or access denied")]
    Unauthorized,

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn not_found<T: Entity>(id: &RecordId) -> Self {
        Self::NotFound {
            entity: T::ELEMENT_NAME.to_string(),
            id: id.as_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Текст для всплывающего уведомления
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not reach the server. Check your connection and retry.".into(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".into(),
            Self::NotFound { entity, .. } => {
                format!("This {} no longer exists. The list has been refreshed.", entity.to_lowercase())
            }
            Self::Validation(errors) => match errors.iter().next() {
                Some((field, message)) => format!("{}: {}", field, message),
                None => "The server rejected the data.".into(),
            },
            Self::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Server { status, .. } => format!("Server error (HTTP {})", status),
            Self::Decode(_) => "The server returned an unexpected response.".into(),
        }
    }

    /// Восстановление ошибки из HTTP-статуса и тела ответа
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound {
                entity: parsed
                    .as_ref()
                    .and_then(|b| b.entity.clone())
                    .unwrap_or_else(|| "Record".into()),
                id: parsed
                    .as_ref()
                    .and_then(|b| b.id.clone())
                    .unwrap_or_default(),
            },
            422 => Self::Validation(
                parsed
                    .and_then(|b| b.field_errors)
                    .unwrap_or_default(),
            ),
            _ => Self::Server {
                status,
                message: parsed.map(|b| b.error).unwrap_or_default(),
            },
        }
    }
}

/// JSON-тело ошибки, которое отдаёт REST API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Сессия, с которой создаётся провайдер
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub access_token: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }

    /// Значение заголовка Authorization
    pub fn authorization_header(&self) -> Option<String> {
        self.access_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }
}

/// Провайдер данных: list/get/create/update/delete по имени коллекции сущности.
///
/// Futures не обязаны быть `Send`: в браузере всё выполняется в одном потоке.
#[async_trait(?Send)]
pub trait DataProvider {
    async fn list<T: Entity>(&self, query: &ListQuery) -> Result<ListResponse<T>, ProviderError>;

    async fn get<T: Entity>(&self, id: &RecordId) -> Result<T, ProviderError>;

    async fn create<T: Entity>(&self, payload: &Payload) -> Result<T, ProviderError>;

    async fn update<T: Entity>(&self, id: &RecordId, payload: &Payload) -> Result<T, ProviderError>;

    async fn delete<T: Entity>(&self, id: &RecordId) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_validation_body() {
        let body = r#"{"error":"Validation failed","code":"VALIDATION_ERROR","field_errors":{"title":"Title must be at least 3 characters"}}"#;
        match ProviderError::from_status(422, body) {
            ProviderError::Validation(errors) => {
                assert_eq!(
                    errors.get("title").map(String::as_str),
                    Some("Title must be at least 3 characters")
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_from_status_not_found_and_auth() {
        let body = r#"{"error":"not found","code":"NOT_FOUND","entity":"Coupon","id":"c1"}"#;
        assert_eq!(
            ProviderError::from_status(404, body),
            ProviderError::NotFound {
                entity: "Coupon".into(),
                id: "c1".into()
            }
        );
        assert_eq!(ProviderError::from_status(401, ""), ProviderError::Unauthorized);
        assert_eq!(
            ProviderError::from_status(500, "oops"),
            ProviderError::Server {
                status: 500,
                message: String::new()
            }
        );
    }

    #[test]
    fn test_authorization_header() {
        assert_eq!(AuthContext::anonymous().authorization_header(), None);
        assert_eq!(
            AuthContext::with_token("abc").authorization_header().as_deref(),
            Some("Bearer abc")
        );
    }
}
