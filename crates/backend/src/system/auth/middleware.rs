use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use crate::shared::config::config;
use crate::shared::error::ApiError;

/// Достать Bearer-токен из заголовка Authorization
pub fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that requires valid JWT authentication (when auth is enabled)
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    if !config().auth.enabled {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;
    let claims = super::jwt::validate_token(token).map_err(|e| {
        tracing::debug!("Rejected token: {:#}", e);
        ApiError::Unauthorized
    })?;

    // Claims доступны обработчикам через extensions
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(header: Option<&str>) -> Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/api/farmers");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&request(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&request(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request(Some("Bearer   "))), None);
        assert_eq!(bearer_token(&request(None)), None);
    }
}
