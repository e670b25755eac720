//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{User, UserActive, UserAdmin};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lin_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nickname: String,
    pub admin: i16,
    pub active: i16,
    pub email: Option<String>,
    pub group_id: Option<i32>,
    pub password: String,
    pub create_time: DateTimeUtc,
    pub update_time: DateTimeUtc,
    /// Soft delete timestamp (NULL = live, set = deleted)
    pub delete_time: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::group::Entity",
        from = "Column::GroupId",
        to = "super::group::Column::Id"
    )]
    Group,
}

impl Related<super::group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            nickname: model.nickname,
            admin: UserAdmin::from(model.admin),
            active: UserActive::from(model.active),
            email: model.email,
            group_id: model.group_id,
            password_hash: model.password,
            create_time: model.create_time,
            update_time: model.update_time,
            delete_time: model.delete_time,
        }
    }
}
