use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// Каталог, где лежат загруженные файлы (по bucket'ам)
    pub root: String,
    /// Публичный адрес каталога, отдаваемый в URL объектов
    pub public_base: String,
    pub max_upload_mb: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AuthConfig {
    pub enabled: bool,
    pub jwt_secret: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default)]
    pub admin_password: String,
    #[serde(default = "default_token_hours")]
    pub token_lifetime_hours: i64,
}

fn default_admin_username() -> String {
    "admin".into()
}

fn default_token_hours() -> i64 {
    24
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "target/db/app.db".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "target/uploads".into(),
            public_base: "http://localhost:3000/uploads".into(),
            max_upload_mb: 5,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            jwt_secret: "change-me".into(),
            admin_username: default_admin_username(),
            admin_password: String::new(),
            token_lifetime_hours: default_token_hours(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
port = 3000

[database]
path = "target/db/app.db"

[storage]
root = "target/uploads"
public_base = "http://localhost:3000/uploads"
max_upload_mb = 5

[auth]
enabled = false
jwt_secret = "change-me"
"#;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.auth.enabled && config.auth.jwt_secret.trim().is_empty() {
        anyhow::bail!("auth.jwt_secret must be set when auth is enabled");
    }
    Ok(config)
}

/// Сделать конфигурацию доступной всему процессу
pub fn install(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration is already installed, keeping the first one");
    }
}

/// Текущая конфигурация; до `install` используются значения по умолчанию
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Resolve a configured path: absolute paths are kept,
/// relative ones are taken from the executable directory
pub fn resolve_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(configured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).expect("embedded config parses");
        assert_eq!(config, Config::default());
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.storage.max_upload_mb, 5);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[database]\npath = \"/var/lib/baykart/app.db\"\n")
            .expect("minimal config parses");
        assert_eq!(config.server.port, 3000);
        assert!(!config.auth.enabled);
        assert_eq!(config.auth.admin_username, "admin");
        assert_eq!(
            resolve_path(&config.database.path),
            PathBuf::from("/var/lib/baykart/app.db")
        );
    }

    #[test]
    fn test_enabled_auth_requires_secret() {
        let contents = r#"
[database]
path = "app.db"

[auth]
enabled = true
jwt_secret = " "
"#;
        assert!(parse_config(contents).is_err());
    }
}
