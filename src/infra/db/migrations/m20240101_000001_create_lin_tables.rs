//! Migration: create user, group and permission tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LinGroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinGroup::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinGroup::Name).string_len(60).not_null().unique_key())
                    .col(ColumnDef::new(LinGroup::Info).string_len(255).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LinUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinUser::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinUser::Nickname).string_len(24).not_null().unique_key())
                    .col(ColumnDef::new(LinUser::Admin).small_integer().not_null().default(1))
                    .col(ColumnDef::new(LinUser::Active).small_integer().not_null().default(1))
                    .col(ColumnDef::new(LinUser::Email).string_len(100).null())
                    .col(ColumnDef::new(LinUser::GroupId).integer().null())
                    .col(ColumnDef::new(LinUser::Password).string_len(255).not_null())
                    .col(
                        ColumnDef::new(LinUser::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(LinUser::UpdateTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(LinUser::DeleteTime).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lin_user_group_id")
                    .table(LinUser::Table)
                    .col(LinUser::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lin_user_delete_time")
                    .table(LinUser::Table)
                    .col(LinUser::DeleteTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LinAuth::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinAuth::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinAuth::GroupId).integer().not_null())
                    .col(ColumnDef::new(LinAuth::Auth).string_len(60).not_null())
                    .col(ColumnDef::new(LinAuth::Module).string_len(50).not_null())
                    .to_owned(),
            )
            .await?;

        // A permission is granted to a group at most once
        manager
            .create_index(
                Index::create()
                    .name("idx_lin_auth_group_id_auth")
                    .table(LinAuth::Table)
                    .col(LinAuth::GroupId)
                    .col(LinAuth::Auth)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LinAuth::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinUser::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinGroup::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LinUser {
    Table,
    Id,
    Nickname,
    Admin,
    Active,
    Email,
    GroupId,
    Password,
    CreateTime,
    UpdateTime,
    DeleteTime,
}

#[derive(Iden)]
enum LinGroup {
    Table,
    Id,
    Name,
    Info,
}

#[derive(Iden)]
enum LinAuth {
    Table,
    Id,
    GroupId,
    Auth,
    Module,
}
