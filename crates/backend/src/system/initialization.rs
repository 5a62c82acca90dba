use anyhow::{Context, Result};

use crate::shared::config::Config;
use crate::shared::storage::storage_root;

/// Создать каталог загрузок, чтобы `/uploads` отдавался с первого запуска
pub async fn ensure_storage_root() -> Result<()> {
    let root = storage_root();
    tokio::fs::create_dir_all(&root)
        .await
        .with_context(|| format!("Cannot create storage root {}", root.display()))?;
    tracing::info!("Storage root: {}", root.display());
    Ok(())
}

/// Предупреждения о небезопасной или неполной настройке входа
pub fn auth_warnings(config: &Config) -> Vec<String> {
    let auth = &config.auth;
    let mut warnings = Vec::new();
    if !auth.enabled {
        warnings.push("Authentication is disabled: the API is open to anyone".to_string());
        return warnings;
    }
    if auth.admin_password.is_empty() {
        warnings.push("auth.admin_password is empty: nobody can sign in".to_string());
    }
    if auth.jwt_secret == "change-me" {
        warnings.push("auth.jwt_secret still has the default value".to_string());
    }
    warnings
}

pub fn report_auth_setup(config: &Config) {
    let warnings = auth_warnings(config);
    if warnings.is_empty() {
        tracing::info!(admin = %config.auth.admin_username, "Authentication enabled");
    }
    for warning in warnings {
        tracing::warn!("{}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::AuthConfig;

    #[test]
    fn test_auth_warnings() {
        let open = Config::default();
        assert_eq!(auth_warnings(&open).len(), 1);

        let mut config = Config::default();
        config.auth = AuthConfig {
            enabled: true,
            ..AuthConfig::default()
        };
        assert_eq!(auth_warnings(&config).len(), 2);

        config.auth.admin_password = "kisan-2024".into();
        config.auth.jwt_secret = "a-long-random-secret".into();
        assert!(auth_warnings(&config).is_empty());
    }
}
