use axum::extract::Json;
use contracts::system::auth::{LoginRequest, LoginResponse};

use crate::shared::config::{config, AuthConfig};
use crate::shared::error::{ApiError, ApiResult};
use crate::system::auth::jwt;

/// Учётные данные администратора из конфигурации; пустой пароль запрещает вход
fn credentials_match(auth: &AuthConfig, request: &LoginRequest) -> bool {
    !auth.admin_password.is_empty()
        && request.username.trim() == auth.admin_username
        && request.password == auth.admin_password
}

/// POST /api/auth/login
pub async fn login(Json(request): Json<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    if !credentials_match(&config().auth, &request) {
        tracing::warn!(username = %request.username, "Failed login attempt");
        return Err(ApiError::Unauthorized);
    }

    let username = request.username.trim().to_string();
    let (access_token, expires_at) = jwt::generate_access_token(&username)?;
    tracing::info!(username = %username, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        expires_at,
        username,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_credentials() {
        let auth = AuthConfig {
            admin_password: "kisan-2024".into(),
            ..AuthConfig::default()
        };
        assert!(credentials_match(&auth, &login_request("admin", "kisan-2024")));
        assert!(credentials_match(&auth, &login_request(" admin ", "kisan-2024")));
        assert!(!credentials_match(&auth, &login_request("admin", "wrong")));
        assert!(!credentials_match(&auth, &login_request("root", "kisan-2024")));
    }

    #[test]
    fn test_empty_password_disables_login() {
        let auth = AuthConfig::default();
        assert!(!credentials_match(&auth, &login_request("admin", "")));
    }
}
