//! HTTP-провайдер данных и хранилище файлов поверх REST API бэкенда

use async_trait::async_trait;
use contracts::domain::common::{Entity, RecordId};
use contracts::shared::list::{ListQuery, ListResponse};
use contracts::shared::provider::{AuthContext, DataProvider, Payload, ProviderError};
use contracts::shared::storage::{ObjectStorage, StoredObject, UploadError, UploadFile, UploadPolicy};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsValue;

use crate::shared::api_utils::{api_base, query_string};

fn authorize(builder: RequestBuilder, auth: &AuthContext) -> RequestBuilder {
    match auth.authorization_header() {
        Some(value) => builder.header("Authorization", &value),
        None => builder,
    }
}

fn network(e: gloo_net::Error) -> ProviderError {
    ProviderError::Network(e.to_string())
}

fn js_error(e: JsValue) -> ProviderError {
    ProviderError::Network(format!("{:?}", e))
}

/// Отправить запрос; не-2xx ответ превращается в [`ProviderError`] по статусу и телу
async fn execute(request: Result<Request, gloo_net::Error>) -> Result<Response, ProviderError> {
    let request = request.map_err(network)?;
    let response = request.send().await.map_err(network)?;
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::warn!("HTTP {} from {}", status, response.url());
    Err(ProviderError::from_status(status, &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

// ============================================================================
// DataProvider
// ============================================================================

/// Провайдер данных REST API. Сессия передаётся при создании
#[derive(Debug, Clone, PartialEq)]
pub struct HttpDataProvider {
    base: String,
    auth: AuthContext,
}

impl HttpDataProvider {
    pub fn new(auth: AuthContext) -> Self {
        Self::with_base(api_base(), auth)
    }

    pub fn with_base(base: impl Into<String>, auth: AuthContext) -> Self {
        Self {
            base: base.into(),
            auth,
        }
    }

    fn collection_url<T: Entity>(&self) -> String {
        format!("{}/api/{}", self.base, T::COLLECTION)
    }

    fn record_url<T: Entity>(&self, id: &RecordId) -> String {
        format!(
            "{}/{}",
            self.collection_url::<T>(),
            urlencoding::encode(&id.as_string())
        )
    }
}

#[async_trait(?Send)]
impl DataProvider for HttpDataProvider {
    async fn list<T: Entity>(&self, query: &ListQuery) -> Result<ListResponse<T>, ProviderError> {
        let url = format!(
            "{}?{}",
            self.collection_url::<T>(),
            query_string(&query.to_query_pairs())
        );
        let response = execute(authorize(Request::get(&url), &self.auth).build()).await?;
        decode(response).await
    }

    async fn get<T: Entity>(&self, id: &RecordId) -> Result<T, ProviderError> {
        let url = self.record_url::<T>(id);
        let response = execute(authorize(Request::get(&url), &self.auth).build()).await?;
        decode(response).await
    }

    async fn create<T: Entity>(&self, payload: &Payload) -> Result<T, ProviderError> {
        let url = self.collection_url::<T>();
        let response = execute(authorize(Request::post(&url), &self.auth).json(payload)).await?;
        decode(response).await
    }

    async fn update<T: Entity>(&self, id: &RecordId, payload: &Payload) -> Result<T, ProviderError> {
        let url = self.record_url::<T>(id);
        let response = execute(authorize(Request::put(&url), &self.auth).json(payload)).await?;
        decode(response).await
    }

    async fn delete<T: Entity>(&self, id: &RecordId) -> Result<(), ProviderError> {
        let url = self.record_url::<T>(id);
        execute(authorize(Request::delete(&url), &self.auth).build()).await?;
        Ok(())
    }
}

// ============================================================================
// ObjectStorage
// ============================================================================

/// Загрузка файлов в `/api/storage/:bucket`
#[derive(Debug, Clone, PartialEq)]
pub struct HttpObjectStorage {
    base: String,
    auth: AuthContext,
}

impl HttpObjectStorage {
    pub fn new(auth: AuthContext) -> Self {
        Self {
            base: api_base(),
            auth,
        }
    }

    /// Ограничения на файлы из конфигурации сервера
    pub async fn policy(&self) -> Result<UploadPolicy, ProviderError> {
        let url = format!("{}/api/upload-policy", self.base);
        let response = execute(authorize(Request::get(&url), &self.auth).build()).await?;
        decode(response).await
    }

    fn multipart(file: &UploadFile, filename_hint: &str) -> Result<web_sys::FormData, ProviderError> {
        let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
        let parts = js_sys::Array::of1(&bytes);
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(&file.content_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(js_error)?;

        let form = web_sys::FormData::new().map_err(js_error)?;
        form.append_with_blob_and_filename("file", &blob, &file.name)
            .map_err(js_error)?;
        form.append_with_str("filename", filename_hint)
            .map_err(js_error)?;
        Ok(form)
    }
}

#[async_trait(?Send)]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        file: &UploadFile,
        filename_hint: &str,
    ) -> Result<StoredObject, UploadError> {
        let url = format!("{}/api/storage/{}", self.base, bucket);
        let form = Self::multipart(file, filename_hint)?;
        let response = execute(authorize(Request::post(&url), &self.auth).body(form)).await?;
        Ok(decode(response).await?)
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), ProviderError> {
        let url = format!(
            "{}/api/storage/{}/{}",
            self.base,
            bucket,
            urlencoding::encode(path)
        );
        execute(authorize(Request::delete(&url), &self.auth).build()).await?;
        Ok(())
    }
}
