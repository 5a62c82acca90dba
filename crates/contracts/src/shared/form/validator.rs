//! Состояние формы сущности: значения, ошибки, "тронутые" поля, отправка
//!
//! Как и контроллер списка, валидатор не держит `&mut self` через сетевой
//! вызов: [`EntityFormValidator::prepare_submit`] выдаёт [`SubmitRequest`],
//! результат которого возвращается в [`EntityFormValidator::finish_submit`].

use std::collections::BTreeSet;
use std::marker::PhantomData;

use super::schema::{FieldKind, FormSchema, FormValues};
use crate::domain::common::{Entity, RecordId};
use crate::shared::provider::{DataProvider, FieldErrors, Payload, ProviderError};
use crate::shared::storage::{
    ObjectStorage, StoredObject, UploadError, UploadFile, UploadPolicy, UploadTracker,
};

/// Первое поле с ошибкой (в порядке схемы) и его вкладка
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstError {
    pub field: String,
    pub tab: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("Form has errors, first one in field {field}")]
    Validation {
        field: String,
        tab: Option<&'static str>,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Submit is already in progress")]
    InFlight,
}

/// Проверенный файл, готовый к отправке в хранилище
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub field: &'static str,
    pub bucket: &'static str,
    pub file: UploadFile,
}

impl UploadRequest {
    pub async fn send<S: ObjectStorage + ?Sized>(&self, storage: &S) -> Result<StoredObject, UploadError> {
        storage.upload(self.bucket, &self.file, &self.file.name).await
    }
}

/// Подготовленный вызов create/update
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub id: Option<RecordId>,
    pub payload: Payload,
}

impl SubmitRequest {
    pub fn is_update(&self) -> bool {
        self.id.is_some()
    }

    pub async fn send<T: Entity, P: DataProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<T, ProviderError> {
        match &self.id {
            Some(id) => provider.update::<T>(id, &self.payload).await,
            None => provider.create::<T>(&self.payload).await,
        }
    }
}

pub struct EntityFormValidator<T: Entity> {
    schema: FormSchema,
    record_id: Option<RecordId>,
    values: FormValues,
    /// Ошибки последних проверок; показываются только для тронутых полей
    errors: FieldErrors,
    touched: BTreeSet<String>,
    submitting: bool,
    uploads: UploadTracker,
    /// Поля, файл для которых сейчас отправляется
    uploading: BTreeSet<&'static str>,
    /// Форма закрыта: поздние загрузки сразу становятся сиротами
    closed: bool,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityFormValidator<T> {
    /// Форма новой записи
    pub fn new() -> Self {
        let schema = T::form_schema();
        let values = schema.default_values();
        Self::from_parts(schema, None, values)
    }

    /// Форма редактирования существующей записи
    pub fn for_record(record: &T) -> Result<Self, serde_json::Error> {
        let schema = T::form_schema();
        let json = serde_json::to_value(record)?;
        let values = schema.values_from_record(&json);
        Ok(Self::from_parts(schema, Some(record.id().clone()), values))
    }

    fn from_parts(schema: FormSchema, record_id: Option<RecordId>, values: FormValues) -> Self {
        Self {
            schema,
            record_id,
            values,
            errors: FieldErrors::new(),
            touched: BTreeSet::new(),
            submitting: false,
            uploads: UploadTracker::new(),
            uploading: BTreeSet::new(),
            closed: false,
            _entity: PhantomData,
        }
    }

    // ============================================================================
    // Состояние
    // ============================================================================

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Ошибка для отображения: у нетронутого поля её нет
    pub fn error(&self, name: &str) -> Option<&str> {
        if !self.touched.contains(name) {
            return None;
        }
        self.errors
            .get(name)
            .map(String::as_str)
            .filter(|e| !e.is_empty())
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|(name, e)| !e.is_empty() && self.touched.contains(name))
    }

    /// Кнопка "Сохранить" активна
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.has_errors()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_uploading(&self, name: &str) -> bool {
        self.uploading.contains(name)
    }

    pub fn has_pending_uploads(&self) -> bool {
        !self.uploading.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_edit_mode(&self) -> bool {
        self.record_id.is_some()
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        self.record_id.as_ref()
    }

    // ============================================================================
    // Редактирование
    // ============================================================================

    /// Изменить значение. Проверяется только если поле уже тронуто;
    /// тронутые зависимые поля перепроверяются всегда.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
        if self.touched.contains(name) {
            self.validate_field(name);
        }
        let dependents: Vec<&'static str> = self.schema.dependents_of(name).collect();
        for dependent in dependents {
            if self.touched.contains(dependent) {
                self.validate_field(dependent);
            }
        }
    }

    /// Потеря фокуса: поле становится тронутым и проверяется
    pub fn touch_field(&mut self, name: &str) {
        self.touched.insert(name.to_string());
        self.validate_field(name);
    }

    /// Тронуть и проверить все поля; `true`, если ошибок нет
    pub fn validate_all(&mut self) -> bool {
        let names: Vec<&'static str> = self.schema.names().collect();
        for name in names {
            self.touched.insert(name.to_string());
            self.validate_field(name);
        }
        !self.has_errors()
    }

    pub fn first_error(&self) -> Option<FirstError> {
        self.schema
            .fields()
            .iter()
            .find(|f| self.error(f.name).is_some())
            .map(|f| FirstError {
                field: f.name.to_string(),
                tab: f.tab,
            })
            .or_else(|| {
                // ошибки сервера по полям, которых нет в схеме
                self.errors
                    .iter()
                    .find(|(name, e)| !e.is_empty() && self.touched.contains(*name))
                    .map(|(name, _)| FirstError {
                        field: name.clone(),
                        tab: None,
                    })
            })
    }

    fn validate_field(&mut self, name: &str) {
        let Some(field) = self.schema.field(name) else {
            return;
        };
        let error = field.validate(&self.values);
        if error.is_empty() {
            self.errors.remove(name);
        } else {
            self.errors.insert(name.to_string(), error);
        }
    }

    // ============================================================================
    // Отправка
    // ============================================================================

    /// Проверить форму и собрать payload. При ошибках провайдер не вызывается
    pub fn prepare_submit(&mut self) -> Result<SubmitRequest, SubmitError> {
        if self.submitting {
            return Err(SubmitError::InFlight);
        }
        if !self.validate_all() {
            return Err(self.validation_error());
        }
        let payload = match self.schema.to_payload(&self.values) {
            Ok(payload) => payload,
            Err(errors) => {
                self.merge_errors(errors);
                return Err(self.validation_error());
            }
        };
        self.submitting = true;
        Ok(SubmitRequest {
            id: self.record_id.clone(),
            payload,
        })
    }

    /// Применить ответ провайдера. При ошибке значения формы не меняются
    pub fn finish_submit(&mut self, result: Result<T, ProviderError>) -> Result<T, SubmitError> {
        self.submitting = false;
        match result {
            Ok(record) => {
                self.uploads.commit();
                self.record_id = Some(record.id().clone());
                Ok(record)
            }
            Err(ProviderError::Validation(errors)) => {
                self.merge_errors(errors.clone());
                Err(SubmitError::Provider(ProviderError::Validation(errors)))
            }
            Err(err) => Err(SubmitError::Provider(err)),
        }
    }

    pub async fn submit<P: DataProvider + ?Sized>(&mut self, provider: &P) -> Result<T, SubmitError> {
        let request = self.prepare_submit()?;
        let result = request.send::<T, P>(provider).await;
        self.finish_submit(result)
    }

    /// Ошибки по полям от сервера: поля становятся тронутыми
    pub fn merge_errors(&mut self, errors: FieldErrors) {
        for (field, message) in errors {
            if message.is_empty() {
                continue;
            }
            self.touched.insert(field.clone());
            self.errors.insert(field, message);
        }
    }

    fn validation_error(&self) -> SubmitError {
        match self.first_error() {
            Some(first) => SubmitError::Validation {
                field: first.field,
                tab: first.tab,
            },
            None => SubmitError::Validation {
                field: String::new(),
                tab: None,
            },
        }
    }

    // ============================================================================
    // Загрузка файлов
    // ============================================================================

    /// Проверить файл по политике и пометить поле как загружаемое.
    /// Отклонённый файл даёт ошибку у поля, значение не меняется
    pub fn prepare_upload(
        &mut self,
        policy: &UploadPolicy,
        name: &str,
        file: UploadFile,
    ) -> Result<UploadRequest, UploadError> {
        let Some(field) = self.schema.field(name) else {
            return Err(UploadError::UnsupportedType(format!("field {}", name)));
        };
        let (field, bucket) = match field.kind {
            FieldKind::Image { bucket } => (field.name, bucket),
            _ => return Err(UploadError::UnsupportedType(format!("field {}", name))),
        };
        if let Err(err) = policy.check_file(&file) {
            self.reject_upload(field, &err);
            return Err(err);
        }
        self.uploading.insert(field);
        Ok(UploadRequest {
            field,
            bucket,
            file,
        })
    }

    /// Применить ответ хранилища.
    ///
    /// `Ok` несёт объект, который больше не нужен и должен быть удалён.
    pub fn finish_upload(
        &mut self,
        request: &UploadRequest,
        result: Result<StoredObject, UploadError>,
    ) -> Result<Option<StoredObject>, UploadError> {
        self.uploading.remove(request.field);
        match result {
            Ok(object) => Ok(self.attach_upload(request.field, object)),
            Err(err) => {
                if !self.closed {
                    self.reject_upload(request.field, &err);
                }
                Err(err)
            }
        }
    }

    /// Файл загружен: его URL становится значением поля.
    ///
    /// Возвращает объект, который больше не нужен: вытесненную загрузку
    /// этой сессии, либо сам новый объект, если форма уже закрыта.
    pub fn attach_upload(&mut self, name: &str, object: StoredObject) -> Option<StoredObject> {
        if self.closed {
            return Some(object);
        }
        let url = object.url.clone();
        let replaced = self.uploads.record(name, object);
        self.set_field(name, url);
        self.touch_field(name);
        replaced
    }

    /// Загрузка отклонена: ошибка показывается у поля, значение не меняется
    pub fn reject_upload(&mut self, name: &str, error: &UploadError) {
        self.touched.insert(name.to_string());
        self.errors.insert(name.to_string(), error.user_message());
    }

    /// Пользователь убрал файл из поля
    pub fn clear_upload(&mut self, name: &str) -> Option<StoredObject> {
        self.set_field(name, "");
        self.uploads.release(name)
    }

    /// Проверить и загрузить файл, затем удалить ненужный объект
    pub async fn upload<S: ObjectStorage + ?Sized>(
        &mut self,
        storage: &S,
        policy: &UploadPolicy,
        name: &str,
        file: UploadFile,
    ) -> Result<(), UploadError> {
        let request = self.prepare_upload(policy, name, file)?;
        let result = request.send(storage).await;
        if let Some(old) = self.finish_upload(&request, result)? {
            // ошибка удаления не влияет на форму
            let _ = storage.remove(&old.bucket, &old.path).await;
        }
        Ok(())
    }

    /// Форма закрыта без сохранения: загрузки сессии надо удалить
    pub fn discard(&mut self) -> Vec<StoredObject> {
        self.closed = true;
        self.uploads.take_orphans()
    }
}

impl<T: Entity> Default for EntityFormValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a002_article::Article;
    use crate::domain::a003_coupon::Coupon;
    use crate::domain::a004_event::Event;
    use crate::shared::list::FilterContext;
    use crate::shared::provider::memory::{Call, MemoryProvider};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    fn provider() -> MemoryProvider {
        MemoryProvider::new(FilterContext::default())
    }

    fn fill_article(form: &mut EntityFormValidator<Article>) {
        form.set_field("title", "Paddy sowing guide");
        form.set_field("category", "farming_tips");
        form.set_field("content", "Soak seeds for 24 hours before sowing.");
    }

    #[test]
    fn test_untouched_field_shows_no_error() {
        let mut form = EntityFormValidator::<Article>::new();
        form.set_field("title", "Hi");
        assert_eq!(form.error("title"), None);
        assert!(form.can_submit());

        form.touch_field("title");
        assert_eq!(form.error("title"), Some("Title must be at least 3 characters"));
        assert!(!form.can_submit());

        form.set_field("title", "Hi!");
        assert_eq!(form.error("title"), None);
    }

    #[tokio::test]
    async fn test_invalid_form_never_calls_provider() {
        let provider = provider();
        let mut form = EntityFormValidator::<Article>::new();
        fill_article(&mut form);
        form.set_field("title", "Hi");

        let result = form.submit(&provider).await;
        assert_eq!(
            result.map(|_| ()),
            Err(SubmitError::Validation {
                field: "title".into(),
                tab: Some("General")
            })
        );
        assert!(provider.calls().is_empty());
        assert!(form.is_touched("content"));
    }

    #[test]
    fn test_first_error_reports_tab() {
        let mut form = EntityFormValidator::<Article>::new();
        form.set_field("title", "Paddy sowing guide");
        form.set_field("category", "farming_tips");
        assert!(!form.validate_all());
        assert_eq!(
            form.first_error(),
            Some(FirstError {
                field: "content".into(),
                tab: Some("Content")
            })
        );
    }

    #[tokio::test]
    async fn test_coupon_percentage_range() {
        let provider = provider();
        let mut form = EntityFormValidator::<Coupon>::new();
        form.set_field("code", "KHARIF25");
        form.set_field("start_date", "2024-06-01");
        form.set_field("end_date", "2024-07-01");

        for bad in ["150", "0", "-5", "abc"] {
            form.set_field("discount_percentage", bad);
            form.touch_field("discount_percentage");
            assert!(form.error("discount_percentage").is_some(), "{} accepted", bad);
        }
        form.set_field("discount_percentage", "150");
        assert_eq!(
            form.error("discount_percentage"),
            Some("Discount percentage must be between 1 and 100")
        );
        assert!(form.submit(&provider).await.is_err());
        assert_eq!(provider.mutation_calls(), 0);

        form.set_field("discount_percentage", "25");
        let coupon = form.submit(&provider).await.expect("valid coupon");
        assert_eq!(coupon.discount_percentage, 25.0);
        match &provider.calls()[0] {
            Call::Create(payload) => {
                assert_eq!(payload.get("discount_percentage"), Some(&json!(25.0)));
                assert_eq!(payload.get("usage_limit"), Some(&Value::Null));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_event_end_time_revalidated_with_start_time() {
        let mut form = EntityFormValidator::<Event>::new();
        form.set_field("start_time", "14:00");
        form.set_field("end_time", "13:00");
        form.touch_field("end_time");
        assert_eq!(form.error("end_time"), Some("End time must be after start time"));

        form.set_field("start_time", "12:00");
        assert_eq!(form.error("end_time"), None);

        form.set_field("start_time", "15:00");
        assert_eq!(form.error("end_time"), Some("End time must be after start time"));
    }

    #[tokio::test]
    async fn test_event_ending_before_start_is_not_submitted() {
        let provider = provider();
        let mut form = EntityFormValidator::<Event>::new();
        form.set_field("title", "Kisan Mela");
        form.set_field("event_date", "2024-11-20");
        form.set_field("start_time", "14:00");
        form.set_field("end_time", "13:00");
        form.set_field("location", "Ludhiana");

        let result = form.submit(&provider).await;
        assert_eq!(
            result.map(|_| ()),
            Err(SubmitError::Validation {
                field: "end_time".into(),
                tab: Some("Schedule")
            })
        );
        assert_eq!(form.error("end_time"), Some("End time must be after start time"));
        assert_eq!(provider.mutation_calls(), 0);

        form.set_field("end_time", "17:30");
        form.submit(&provider).await.expect("valid event");
        assert_eq!(provider.mutation_calls(), 1);
    }

    #[tokio::test]
    async fn test_edit_round_trip_without_changes() {
        let provider = provider();
        let original = Coupon {
            id: RecordId::from(7),
            code: "RABI10".into(),
            description: Some("Rabi season offer".into()),
            discount_percentage: 12.5,
            max_discount_amount: Some(500.0),
            min_order_amount: None,
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 10, 1),
            end_date: chrono::NaiveDate::from_ymd_opt(2024, 12, 31),
            usage_limit: Some(100),
            is_active: true,
            ..Default::default()
        };
        provider.seed(std::slice::from_ref(&original));

        let mut form = EntityFormValidator::for_record(&original).expect("coupon serializes");
        assert!(form.is_edit_mode());
        let saved = form.submit(&provider).await.expect("unchanged form is valid");
        assert_eq!(saved.code, original.code);
        assert_eq!(saved.description, original.description);
        assert_eq!(saved.discount_percentage, original.discount_percentage);
        assert_eq!(saved.max_discount_amount, original.max_discount_amount);
        assert_eq!(saved.min_order_amount, None);
        assert_eq!(saved.start_date, original.start_date);
        assert_eq!(saved.end_date, original.end_date);
        assert_eq!(saved.usage_limit, original.usage_limit);
        assert!(matches!(provider.calls()[0], Call::Update(..)));
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_form_state() {
        let provider = provider();
        let mut form = EntityFormValidator::<Article>::new();
        fill_article(&mut form);
        provider.fail_next(ProviderError::Network("offline".into()));

        let result = form.submit(&provider).await;
        assert!(matches!(
            result,
            Err(SubmitError::Provider(ProviderError::Network(_)))
        ));
        assert_eq!(form.value("title"), "Paddy sowing guide");
        assert!(!form.is_submitting());
        assert!(!form.is_edit_mode());

        let article = form.submit(&provider).await.expect("retry succeeds");
        assert_eq!(article.title, "Paddy sowing guide");
        assert!(form.is_edit_mode());
    }

    #[tokio::test]
    async fn test_server_field_errors_are_merged() {
        let provider = provider();
        let mut form = EntityFormValidator::<Article>::new();
        fill_article(&mut form);
        let mut errors = FieldErrors::new();
        errors.insert("slug".into(), "Slug is already taken".into());
        provider.fail_next(ProviderError::Validation(errors));

        assert!(form.submit(&provider).await.is_err());
        assert_eq!(form.error("slug"), Some("Slug is already taken"));
        assert_eq!(form.first_error().map(|e| e.field), Some("slug".to_string()));

        form.set_field("slug", "paddy-sowing-guide");
        assert_eq!(form.error("slug"), None);
    }

    #[test]
    fn test_second_submit_while_in_flight() {
        let mut form = EntityFormValidator::<Article>::new();
        fill_article(&mut form);
        let request = form.prepare_submit().expect("valid");
        assert!(!request.is_update());
        assert_eq!(form.prepare_submit(), Err(SubmitError::InFlight));
        assert!(!form.can_submit());
    }

    struct FakeStorage {
        removed: RefCell<Vec<String>>,
        counter: RefCell<u32>,
    }

    #[async_trait(?Send)]
    impl ObjectStorage for FakeStorage {
        async fn upload(
            &self,
            bucket: &str,
            file: &UploadFile,
            _filename_hint: &str,
        ) -> Result<StoredObject, UploadError> {
            *self.counter.borrow_mut() += 1;
            let path = format!("{}-{}", self.counter.borrow(), file.name);
            Ok(StoredObject {
                bucket: bucket.to_string(),
                url: format!("/uploads/{}/{}", bucket, path),
                path,
            })
        }

        async fn remove(&self, _bucket: &str, path: &str) -> Result<(), ProviderError> {
            self.removed.borrow_mut().push(path.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_uploads_replaced_rejected_and_orphaned() {
        let storage = FakeStorage {
            removed: RefCell::new(Vec::new()),
            counter: RefCell::new(0),
        };
        let policy = UploadPolicy::images(1);
        let png = UploadFile {
            name: "field.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; 16],
        };
        let mut form = EntityFormValidator::<Article>::new();

        form.upload(&storage, &policy, "image_url", png.clone()).await.expect("upload");
        form.upload(&storage, &policy, "image_url", png.clone()).await.expect("upload");
        assert_eq!(form.value("image_url"), "/uploads/articles/2-field.png");
        assert_eq!(*storage.removed.borrow(), vec!["1-field.png".to_string()]);

        let pdf = UploadFile {
            name: "doc.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: vec![0; 16],
        };
        assert!(form.upload(&storage, &policy, "image_url", pdf).await.is_err());
        assert_eq!(form.error("image_url"), Some("Files of type application/pdf are not allowed"));
        assert_eq!(form.value("image_url"), "/uploads/articles/2-field.png");

        let orphans = form.discard();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].path, "2-field.png");
    }

    #[tokio::test]
    async fn test_upload_finishing_after_close_is_orphaned() {
        let storage = FakeStorage {
            removed: RefCell::new(Vec::new()),
            counter: RefCell::new(0),
        };
        let png = UploadFile {
            name: "banner.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; 16],
        };
        let mut form = EntityFormValidator::<Event>::new();

        let request = form
            .prepare_upload(&UploadPolicy::default(), "image_url", png)
            .expect("valid image");
        assert_eq!(request.bucket, "events");
        assert!(form.is_uploading("image_url"));
        assert!(form.has_pending_uploads());

        let result = request.send(&storage).await;
        assert!(form.discard().is_empty());
        assert!(form.is_closed());

        let leftover = form.finish_upload(&request, result).expect("stored");
        assert_eq!(leftover.map(|o| o.path), Some("1-banner.png".to_string()));
        assert_eq!(form.value("image_url"), "");
        assert!(!form.has_pending_uploads());
        assert!(form.discard().is_empty());
    }

    #[test]
    fn test_upload_to_plain_field_is_rejected() {
        let mut form = EntityFormValidator::<Event>::new();
        let png = UploadFile {
            name: "banner.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; 16],
        };
        assert!(form
            .prepare_upload(&UploadPolicy::default(), "title", png)
            .is_err());
        assert!(!form.has_pending_uploads());
    }
}
