//! Permission (`lin_auth`) database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Permission;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lin_auth")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub group_id: i32,
    pub auth: String,
    pub module: String,
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

impl From<Model> for Permission {
    fn from(model: Model) -> Self {
        Permission {
            id: model.id,
            group_id: model.group_id,
            auth: model.auth,
            module: model.module,
        }
    }
}
