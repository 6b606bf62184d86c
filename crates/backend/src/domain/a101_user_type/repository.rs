use chrono::Utc;
use contracts::domain::a101_user_type::{UserType, UserTypeId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a101_user_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub additional_config: Json,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserType {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        UserType {
            base: BaseAggregate::with_metadata(
                UserTypeId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            additional_config: m.additional_config,
        }
    }
}

fn to_active_model(aggregate: &UserType) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.to_string_id()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        additional_config: Set(aggregate.additional_config.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn insert(aggregate: &UserType) -> anyhow::Result<Uuid> {
    let conn = get_connection();
    to_active_model(aggregate).insert(conn).await?;
    Ok(aggregate.base.id.value())
}

pub async fn update(aggregate: &UserType) -> anyhow::Result<()> {
    let conn = get_connection();
    to_active_model(aggregate).update(conn).await?;
    Ok(())
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<UserType>> {
    let conn = get_connection();
    let found = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?;
    Ok(found.map(UserType::from))
}

pub async fn list_all() -> anyhow::Result<Vec<UserType>> {
    let conn = get_connection();
    let rows = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Description)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(UserType::from).collect())
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
