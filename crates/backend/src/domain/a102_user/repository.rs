use chrono::Utc;
use contracts::domain::a101_user_type::UserTypeId;
use contracts::domain::a102_user::{User, UserId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a102_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub email: String,
    pub user_type_id: Option<String>,
    pub additional_data: Json,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let user_type_id = m
            .user_type_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(UserTypeId::new);

        User {
            base: BaseAggregate::with_metadata(
                UserId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            email: m.email,
            user_type_id,
            additional_data: m.additional_data,
        }
    }
}

fn to_active_model(aggregate: &User) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.to_string_id()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        email: Set(aggregate.email.clone()),
        user_type_id: Set(aggregate.user_type_id.map(|id| id.value().to_string())),
        additional_data: Set(aggregate.additional_data.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn insert(aggregate: &User) -> anyhow::Result<Uuid> {
    let conn = get_connection();
    to_active_model(aggregate).insert(conn).await?;
    Ok(aggregate.base.id.value())
}

pub async fn update(aggregate: &User) -> anyhow::Result<()> {
    let conn = get_connection();
    to_active_model(aggregate).update(conn).await?;
    Ok(())
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<User>> {
    let conn = get_connection();
    let found = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?;
    Ok(found.map(User::from))
}

pub async fn list_all() -> anyhow::Result<Vec<User>> {
    let conn = get_connection();
    let rows = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Description)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(User::from).collect())
}

pub async fn list_by_user_type(user_type_id: Uuid) -> anyhow::Result<Vec<User>> {
    let conn = get_connection();
    let rows = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::UserTypeId.eq(user_type_id.to_string()))
        .order_by_asc(Column::Description)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(User::from).collect())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    let conn = get_connection();
    let Some(found) = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?
    else {
        return Ok(false);
    };

    let mut active: ActiveModel = found.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(Some(Utc::now()));
    active.update(conn).await?;
    Ok(true)
}
