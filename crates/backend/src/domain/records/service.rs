//! Общий CRUD-сервис: любая [`Entity`] хранится в `entity_record` своей коллекции

use anyhow::Context;
use chrono::Utc;
use contracts::domain::common::{Entity, RecordId};
use contracts::shared::list::{FilterContext, ListQuery, ListResponse};
use contracts::shared::provider::Payload;
use sea_orm::DatabaseConnection;
use serde_json::Value;

use super::repository::{self, Model};
use crate::shared::error::{ApiError, ApiResult};

/// Собрать JSON записи: payload + id и timestamps из строки таблицы
fn record_value(model: &Model) -> anyhow::Result<Value> {
    let mut object: Payload = serde_json::from_str(&model.payload)
        .with_context(|| format!("corrupt payload in record {}", model.id))?;
    object.insert("id".into(), Value::String(model.id.clone()));
    if let Some(created_at) = model.created_at {
        object.insert("created_at".into(), serde_json::to_value(created_at)?);
    }
    if let Some(updated_at) = model.updated_at {
        object.insert("updated_at".into(), serde_json::to_value(updated_at)?);
    }
    Ok(Value::Object(object))
}

fn to_record<T: Entity>(model: &Model) -> anyhow::Result<T> {
    let value = record_value(model)?;
    serde_json::from_value(value)
        .with_context(|| format!("record {} does not decode as {}", model.id, T::ELEMENT_NAME))
}

/// Оставить только поля формы; служебные (id, timestamps) задаёт сервер
fn schema_payload<T: Entity>(payload: &Payload) -> Payload {
    let schema = T::form_schema();
    payload
        .iter()
        .filter(|(key, _)| schema.field(key).is_some())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn validate<T: Entity>(payload: &Payload) -> ApiResult<()> {
    let errors = T::form_schema().validate_payload(payload);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn list<T: Entity>(
    conn: &DatabaseConnection,
    query: &ListQuery,
) -> ApiResult<ListResponse<T>> {
    let rows = repository::list_by_collection(conn, T::COLLECTION).await?;
    let ctx = FilterContext::now();

    let mut items: Vec<T> = rows
        .iter()
        .filter_map(|row| match to_record::<T>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(collection = T::COLLECTION, "Skipping record: {:#}", e);
                None
            }
        })
        .filter(|record| record.matches(&query.filters, &ctx))
        .collect();

    if let Some(sort) = &query.sort {
        items.sort_by(|a, b| sort.apply(a.compare_by_field(b, &sort.field)));
    }

    let total = items.len();
    let page: Vec<T> = items
        .into_iter()
        .skip(query.offset())
        .take(query.page_size)
        .collect();
    Ok(ListResponse::new(page, total as u64))
}

pub async fn get<T: Entity>(conn: &DatabaseConnection, id: &RecordId) -> ApiResult<T> {
    let key = id.as_string();
    let row = repository::find(conn, T::COLLECTION, &key)
        .await?
        .ok_or_else(|| ApiError::not_found(T::ELEMENT_NAME, key))?;
    Ok(to_record(&row)?)
}

pub async fn create<T: Entity>(conn: &DatabaseConnection, payload: &Payload) -> ApiResult<T> {
    let payload = schema_payload::<T>(payload);
    validate::<T>(&payload)?;

    let now = Utc::now();
    let model = Model {
        id: uuid::Uuid::new_v4().to_string(),
        collection: T::COLLECTION.to_string(),
        payload: serde_json::to_string(&payload).context("serialize payload")?,
        is_deleted: false,
        created_at: Some(now),
        updated_at: Some(now),
        version: 1,
    };
    let record: T = to_record(&model)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {:#}", T::ELEMENT_NAME, e)))?;

    repository::insert(conn, &model).await?;
    tracing::info!(collection = T::COLLECTION, id = %model.id, "Record created");
    Ok(record)
}

/// Частичное обновление: переданные поля поверх сохранённых
pub async fn update<T: Entity>(
    conn: &DatabaseConnection,
    id: &RecordId,
    payload: &Payload,
) -> ApiResult<T> {
    let key = id.as_string();
    let mut model = repository::find(conn, T::COLLECTION, &key)
        .await?
        .ok_or_else(|| ApiError::not_found(T::ELEMENT_NAME, key.clone()))?;

    let mut merged: Payload = serde_json::from_str(&model.payload)
        .with_context(|| format!("corrupt payload in record {}", key))?;
    merged.extend(schema_payload::<T>(payload));
    validate::<T>(&merged)?;

    model.payload = serde_json::to_string(&merged).context("serialize payload")?;
    model.updated_at = Some(Utc::now());
    model.version += 1;
    let record: T = to_record(&model)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {:#}", T::ELEMENT_NAME, e)))?;

    repository::update(conn, &model).await?;
    tracing::info!(collection = T::COLLECTION, id = %key, version = model.version, "Record updated");
    Ok(record)
}

pub async fn delete<T: Entity>(conn: &DatabaseConnection, id: &RecordId) -> ApiResult<()> {
    let key = id.as_string();
    if !repository::soft_delete(conn, T::COLLECTION, &key).await? {
        return Err(ApiError::not_found(T::ELEMENT_NAME, key));
    }
    tracing::info!(collection = T::COLLECTION, id = %key, "Record deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a002_article::Article;
    use contracts::domain::a005_farmer::Farmer;
    use contracts::shared::list::{FilterState, FilterValue, SortState};
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn article(title: &str) -> Payload {
        payload(json!({
            "title": title,
            "category": "farming_tips",
            "content": "Sow after the first monsoon rain.",
            "tags": ["kharif"],
            "is_published": false
        }))
    }

    fn farmer(name: &str, state: &str, phone: &str) -> Payload {
        payload(json!({
            "name": name,
            "phone": phone,
            "state": state,
            "primary_crops": ["wheat"],
            "is_verified": false
        }))
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let conn = connect_in_memory().await.expect("db");
        let created: Article = create(&conn, &article("Drip irrigation basics"))
            .await
            .expect("created");
        assert!(matches!(created.id, RecordId::Text(_)));
        assert!(created.metadata.created_at.is_some());

        let loaded: Article = get(&conn, &created.id).await.expect("loaded");
        assert_eq!(loaded.title, "Drip irrigation basics");
        assert_eq!(loaded.tags, vec!["kharif".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_payload_is_rejected_with_field_errors() {
        let conn = connect_in_memory().await.expect("db");
        let err = create::<Article>(&conn, &article("ab")).await.unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(
                errors.get("title").map(String::as_str),
                Some("Title must be at least 3 characters")
            ),
            other => panic!("unexpected {:?}", other),
        }
        let listed: ListResponse<Article> = list(&conn, &ListQuery::default()).await.expect("list");
        assert_eq!(listed.total_count, 0);
    }

    #[tokio::test]
    async fn test_update_merges_and_ignores_unknown_fields() {
        let conn = connect_in_memory().await.expect("db");
        let created: Article = create(&conn, &article("Soil testing")).await.expect("created");

        let changes = payload(json!({ "is_published": true, "id": "hijack", "views": 10 }));
        let updated: Article = update(&conn, &created.id, &changes).await.expect("updated");
        assert_eq!(updated.id, created.id);
        assert!(updated.is_published);
        assert_eq!(updated.title, "Soil testing");
        assert_eq!(updated.metadata.created_at, created.metadata.created_at);
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let conn = connect_in_memory().await.expect("db");
        let created: Article = create(&conn, &article("Mandi prices")).await.expect("created");
        delete::<Article>(&conn, &created.id).await.expect("deleted");

        assert!(matches!(
            get::<Article>(&conn, &created.id).await,
            Err(ApiError::NotFound { entity: "Article", .. })
        ));
        assert!(matches!(
            delete::<Article>(&conn, &created.id).await,
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            update::<Article>(&conn, &RecordId::from("nope"), &article("Anything")).await,
            Err(ApiError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_sorts_and_pages() {
        let conn = connect_in_memory().await.expect("db");
        for i in 0..25 {
            let state = if i % 2 == 0 { "punjab" } else { "kerala" };
            let _: Farmer = create(&conn, &farmer(&format!("Farmer {:02}", i), state, "9876543210"))
                .await
                .expect("created");
        }

        let query = ListQuery {
            filters: FilterState::new().with("state", FilterValue::choice("punjab")),
            page: 2,
            page_size: 10,
            sort: Some(SortState::asc("name")),
        };
        let page: ListResponse<Farmer> = list(&conn, &query).await.expect("list");
        assert_eq!(page.total_count, 13);
        let names: Vec<&str> = page.items.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Farmer 20", "Farmer 22", "Farmer 24"]);

        let beyond = ListQuery { page: 5, ..query };
        let empty: ListResponse<Farmer> = list(&conn, &beyond).await.expect("list");
        assert!(empty.items.is_empty());
        assert_eq!(empty.total_count, 13);
    }
}
