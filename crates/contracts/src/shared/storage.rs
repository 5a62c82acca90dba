//! Объектное хранилище файлов (картинки статей, событий, культур)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::provider::ProviderError;

/// Файл, выбранный пользователем для загрузки
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Загруженный объект
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub bucket: String,
    /// Имя объекта внутри bucket
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error("File is too large ({actual} bytes, limit {limit} bytes)")]
    TooLarge { limit: u64, actual: u64 },

    #[error("File type {0} is not allowed")]
    UnsupportedType(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl UploadError {
    /// Текст рядом с полем загрузки
    pub fn user_message(&self) -> String {
        match self {
            Self::TooLarge { limit, .. } => {
                format!("File must be smaller than {}", format_size(*limit))
            }
            Self::UnsupportedType(mime) => format!("Files of type {} are not allowed", mime),
            Self::Provider(err) => err.user_message(),
        }
    }
}

/// Ограничения на загружаемые файлы: проверяются и в браузере, и на сервере
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub allowed_mime: Vec<String>,
}

impl UploadPolicy {
    pub fn images(max_mb: u64) -> Self {
        Self {
            max_bytes: max_mb * 1024 * 1024,
            allowed_mime: ["image/jpeg", "image/png", "image/webp", "image/gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn check(&self, content_type: &str, size: u64) -> Result<(), UploadError> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        if !self.allowed_mime.iter().any(|m| *m == mime) {
            return Err(UploadError::UnsupportedType(if mime.is_empty() {
                "unknown".into()
            } else {
                mime
            }));
        }
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
                actual: size,
            });
        }
        Ok(())
    }

    pub fn check_file(&self, file: &UploadFile) -> Result<(), UploadError> {
        self.check(&file.content_type, file.size())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::images(5)
    }
}

/// Хранилище объектов
#[async_trait(?Send)]
pub trait ObjectStorage {
    /// Загрузить файл и вернуть его публичный адрес
    async fn upload(
        &self,
        bucket: &str,
        file: &UploadFile,
        filename_hint: &str,
    ) -> Result<StoredObject, UploadError>;

    /// Удалить объект; best-effort, уже сохранённую запись не откатывает
    async fn remove(&self, bucket: &str, path: &str) -> Result<(), ProviderError>;
}

/// Загрузки, сделанные за одну сессию формы.
///
/// Успешное сохранение фиксирует их; при закрытии формы без сохранения
/// они возвращаются как "сироты" для удаления. Замена файла в том же поле
/// возвращает предыдущую загрузку этой сессии.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadTracker {
    pending: Vec<(String, StoredObject)>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Запомнить загрузку поля; вернуть вытесненную загрузку того же поля
    pub fn record(&mut self, field: &str, object: StoredObject) -> Option<StoredObject> {
        let replaced = self
            .pending
            .iter()
            .position(|(f, _)| f == field)
            .map(|index| self.pending.remove(index).1);
        self.pending.push((field.to_string(), object));
        replaced
    }

    /// Поле очищено пользователем: загрузка этой сессии больше не нужна
    pub fn release(&mut self, field: &str) -> Option<StoredObject> {
        let index = self.pending.iter().position(|(f, _)| f == field)?;
        Some(self.pending.remove(index).1)
    }

    /// Запись сохранена, все загрузки теперь на неё ссылаются
    pub fn commit(&mut self) {
        self.pending.clear();
    }

    /// Форма закрыта без сохранения
    pub fn take_orphans(&mut self) -> Vec<StoredObject> {
        self.pending.drain(..).map(|(_, o)| o).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}
