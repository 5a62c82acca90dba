use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

/// Запись любой сущности: payload хранится как JSON-текст
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entity_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub collection: String,
    pub payload: String,
    pub is_deleted: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Все живые записи коллекции, новые первыми
pub async fn list_by_collection(
    conn: &DatabaseConnection,
    collection: &str,
) -> anyhow::Result<Vec<Model>> {
    let items = Entity::find()
        .filter(Column::Collection.eq(collection))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(conn)
        .await?;
    Ok(items)
}

pub async fn find(
    conn: &DatabaseConnection,
    collection: &str,
    id: &str,
) -> anyhow::Result<Option<Model>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::Collection.eq(collection))
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?;
    Ok(result)
}

pub async fn insert(conn: &DatabaseConnection, model: &Model) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(model.id.clone()),
        collection: Set(model.collection.clone()),
        payload: Set(model.payload.clone()),
        is_deleted: Set(false),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
        version: Set(model.version),
    };
    active.insert(conn).await?;
    Ok(())
}

pub async fn update(conn: &DatabaseConnection, model: &Model) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(model.id.clone()),
        payload: Set(model.payload.clone()),
        updated_at: Set(model.updated_at),
        version: Set(model.version),
        collection: sea_orm::ActiveValue::NotSet,
        is_deleted: sea_orm::ActiveValue::NotSet,
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(conn).await?;
    Ok(())
}

pub async fn soft_delete(conn: &DatabaseConnection, collection: &str, id: &str) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .filter(Column::Collection.eq(collection))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}
