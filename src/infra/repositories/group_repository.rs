//! Group repository; multi-table writes run inside a transaction.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::entities::auth::{self, Entity as AuthEntity};
use super::entities::group::{self, Entity as GroupEntity};
use crate::domain::{Group, PermissionView};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Group>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Group>>;

    /// Page of groups ordered by id
    async fn list(&self, start: u64, count: u64) -> AppResult<Vec<Group>>;

    async fn list_all(&self) -> AppResult<Vec<Group>>;

    async fn count(&self) -> AppResult<u64>;

    /// Insert a group and its permissions atomically
    async fn create_with_permissions(
        &self,
        name: String,
        info: Option<String>,
        permissions: Vec<PermissionView>,
    ) -> AppResult<Group>;

    async fn update(&self, id: i32, name: String, info: Option<String>) -> AppResult<Group>;

    /// Remove a group and every permission granted to it atomically
    async fn delete_with_permissions(&self, id: i32) -> AppResult<()>;
}

pub struct GroupStore {
    db: DatabaseConnection,
}

impl GroupStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn commit_or_rollback<T>(txn: DatabaseTransaction, result: AppResult<T>) -> AppResult<T> {
        match result {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

async fn insert_group(
    txn: &DatabaseTransaction,
    name: String,
    info: Option<String>,
    permissions: Vec<PermissionView>,
) -> AppResult<Group> {
    let model = group::ActiveModel {
        name: Set(name),
        info: Set(info),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    if !permissions.is_empty() {
        let rows = permissions.into_iter().map(|p| auth::ActiveModel {
            group_id: Set(model.id),
            auth: Set(p.auth),
            module: Set(p.module),
            ..Default::default()
        });
        AuthEntity::insert_many(rows).exec(txn).await?;
    }

    Ok(Group::from(model))
}

async fn remove_group(txn: &DatabaseTransaction, id: i32) -> AppResult<()> {
    AuthEntity::delete_many()
        .filter(auth::Column::GroupId.eq(id))
        .exec(txn)
        .await?;

    let result = GroupEntity::delete_by_id(id).exec(txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Group not found"));
    }

    Ok(())
}

#[async_trait]
impl GroupRepository for GroupStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Group>> {
        let result = GroupEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Group::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Group>> {
        let result = GroupEntity::find()
            .filter(group::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Group::from))
    }

    async fn list(&self, start: u64, count: u64) -> AppResult<Vec<Group>> {
        let models = GroupEntity::find()
            .order_by_asc(group::Column::Id)
            .offset(start)
            .limit(count)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Group::from).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Group>> {
        let models = GroupEntity::find()
            .order_by_asc(group::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Group::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        GroupEntity::find()
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn create_with_permissions(
        &self,
        name: String,
        info: Option<String>,
        permissions: Vec<PermissionView>,
    ) -> AppResult<Group> {
        let txn = self.db.begin().await.map_err(AppError::from)?;
        let result = insert_group(&txn, name, info, permissions).await;
        Self::commit_or_rollback(txn, result).await
    }

    async fn update(&self, id: i32, name: String, info: Option<String>) -> AppResult<Group> {
        let model = GroupEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Group not found")?;

        let mut active: group::ActiveModel = model.into();
        active.name = Set(name);
        active.info = Set(info);

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(Group::from(model))
    }

    async fn delete_with_permissions(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(AppError::from)?;
        let result = remove_group(&txn, id).await;
        Self::commit_or_rollback(txn, result).await
    }
}
