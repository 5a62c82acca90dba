use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::shared::provider::{ApiErrorBody, FieldErrors};
use contracts::shared::storage::UploadError;

/// Ошибка HTTP-обработчика; сериализуется в [`ApiErrorBody`]
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upload(UploadError::UnsupportedType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Upload(UploadError::Provider(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(&self) -> ApiErrorBody {
        match self {
            Self::NotFound { entity, id } => ApiErrorBody {
                error: self.to_string(),
                code: "NOT_FOUND".into(),
                entity: Some(entity.to_string()),
                id: Some(id.clone()),
                ..Default::default()
            },
            Self::Validation(errors) => ApiErrorBody {
                error: self.to_string(),
                code: "VALIDATION_ERROR".into(),
                field_errors: Some(errors.clone()),
                ..Default::default()
            },
            Self::BadRequest(msg) => ApiErrorBody {
                error: msg.clone(),
                code: "BAD_REQUEST".into(),
                ..Default::default()
            },
            Self::Unauthorized => ApiErrorBody {
                error: self.to_string(),
                code: "UNAUTHORIZED".into(),
                ..Default::default()
            },
            Self::Upload(err @ (UploadError::TooLarge { .. } | UploadError::UnsupportedType(_))) => {
                ApiErrorBody {
                    error: err.user_message(),
                    code: "UPLOAD_REJECTED".into(),
                    ..Default::default()
                }
            }
            Self::Upload(UploadError::Provider(_)) | Self::Internal(_) => ApiErrorBody {
                error: "An internal error occurred".into(),
                code: "INTERNAL_ERROR".into(),
                ..Default::default()
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::provider::ProviderError;

    #[test]
    fn test_validation_maps_to_422_with_field_errors() {
        let mut errors = FieldErrors::new();
        errors.insert("title".into(), "Title must be at least 3 characters".into());
        let err = ApiError::Validation(errors.clone());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body().field_errors, Some(errors));
    }

    #[test]
    fn test_body_round_trips_through_provider_error() {
        let err = ApiError::not_found("Coupon", "c-1");
        let body = serde_json::to_string(&err.body()).expect("serialize");
        assert_eq!(
            ProviderError::from_status(err.status().as_u16(), &body),
            ProviderError::NotFound {
                entity: "Coupon".into(),
                id: "c-1".into()
            }
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::Internal(anyhow::anyhow!("disk I/O error at /var/db"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body().error, "An internal error occurred");

        let upload = ApiError::from(UploadError::UnsupportedType("text/html".into()));
        assert_eq!(upload.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
