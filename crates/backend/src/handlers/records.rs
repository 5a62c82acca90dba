//! Обработчики CRUD, общие для всех сущностей.
//!
//! Регистрируются в роутере с конкретным типом: `get(records::list::<Farmer>)`.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::common::{Entity, RecordId};
use contracts::shared::list::{ListQuery, ListResponse};
use contracts::shared::provider::Payload;

use crate::domain::records::service;
use crate::shared::data::db::get_connection;
use crate::shared::error::{ApiError, ApiResult};

fn parse_id(raw: &str) -> ApiResult<RecordId> {
    RecordId::from_string(raw).map_err(ApiError::BadRequest)
}

/// GET /api/<collection>?page=..&page_size=..&<filters>
pub async fn list<T: Entity>(
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<ListResponse<T>>> {
    let query = ListQuery::from_query_pairs(
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        &T::filter_specs(),
    );
    let conn = get_connection()?;
    let response = service::list::<T>(conn, &query).await?;
    Ok(Json(response))
}

/// GET /api/<collection>/:id
pub async fn get_by_id<T: Entity>(Path(id): Path<String>) -> ApiResult<Json<T>> {
    let id = parse_id(&id)?;
    let conn = get_connection()?;
    Ok(Json(service::get::<T>(conn, &id).await?))
}

/// POST /api/<collection>
pub async fn create<T: Entity>(
    Json(payload): Json<Payload>,
) -> ApiResult<(StatusCode, Json<T>)> {
    let conn = get_connection()?;
    let record = service::create::<T>(conn, &payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/<collection>/:id
pub async fn update<T: Entity>(
    Path(id): Path<String>,
    Json(payload): Json<Payload>,
) -> ApiResult<Json<T>> {
    let id = parse_id(&id)?;
    let conn = get_connection()?;
    Ok(Json(service::update::<T>(conn, &id, &payload).await?))
}

/// DELETE /api/<collection>/:id
pub async fn delete<T: Entity>(Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let conn = get_connection()?;
    service::delete::<T>(conn, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
