//! Файловое объектное хранилище: `<root>/<bucket>/<name>`

use anyhow::Context;
use contracts::shared::storage::{StoredObject, UploadPolicy};
use std::path::PathBuf;

use crate::shared::config::{config, resolve_path};
use crate::shared::error::ApiError;

pub fn storage_root() -> PathBuf {
    resolve_path(&config().storage.root)
}

pub fn upload_policy() -> UploadPolicy {
    UploadPolicy::images(config().storage.max_upload_mb)
}

/// Имя bucket'а: латиница, цифры, `-` и `_`
pub fn check_bucket(bucket: &str) -> Result<(), ApiError> {
    let ok = !bucket.is_empty()
        && bucket.len() <= 64
        && bucket
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Invalid bucket name: {}", bucket)))
    }
}

/// Безопасное имя файла из пользовательского: без путей, только `[a-z0-9._-]`
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let mut cleaned: String = base
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    while cleaned.contains("--") {
        cleaned = cleaned.replace("--", "-");
    }
    let cleaned = cleaned.trim_matches(|c: char| c == '-' || c == '.').to_string();
    if cleaned.is_empty() {
        "file".into()
    } else {
        cleaned.chars().take(80).collect()
    }
}

/// Уникальное имя объекта: короткий uuid-префикс + очищенное имя
pub fn object_name(hint: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", &id[..12], sanitize_filename(hint))
}

pub fn public_url(bucket: &str, name: &str) -> String {
    format!(
        "{}/{}/{}",
        config().storage.public_base.trim_end_matches('/'),
        bucket,
        name
    )
}

pub async fn save(bucket: &str, hint: &str, bytes: &[u8]) -> Result<StoredObject, ApiError> {
    check_bucket(bucket)?;
    let name = object_name(hint);
    let dir = storage_root().join(bucket);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("create bucket dir {}", dir.display()))?;
    let path = dir.join(&name);
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    tracing::info!(bucket, name = %name, size = bytes.len(), "Stored upload");
    Ok(StoredObject {
        bucket: bucket.to_string(),
        url: public_url(bucket, &name),
        path: name,
    })
}

pub async fn remove(bucket: &str, name: &str) -> Result<(), ApiError> {
    check_bucket(bucket)?;
    if sanitize_filename(name) != name {
        return Err(ApiError::BadRequest(format!("Invalid object name: {}", name)));
    }
    let path = storage_root().join(bucket).join(name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(bucket, name, "Removed upload");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::not_found("File", name)),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("remove {}", path.display()))
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_paths_and_symbols() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\Paddy Field (1).JPG"), "paddy-field-1-.jpg");
        assert_eq!(sanitize_filename("   "), "file");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn test_object_name_keeps_extension() {
        let name = object_name("Kisan Mela.png");
        assert!(name.ends_with("-kisan-mela.png"));
        assert_eq!(sanitize_filename(&name), name);
    }

    #[test]
    fn test_upload_policy_follows_config() {
        let policy = upload_policy();
        assert_eq!(policy.max_bytes, config().storage.max_upload_mb * 1024 * 1024);
        assert!(policy.check("image/webp", 1024).is_ok());
    }

    #[test]
    fn test_bucket_names() {
        assert!(check_bucket("articles").is_ok());
        assert!(check_bucket("../secrets").is_err());
        assert!(check_bucket("").is_err());
    }
}
