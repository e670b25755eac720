//! Permission (`lin_auth`) repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DeleteMany, EntityTrait, QueryFilter,
    QueryOrder, Select, Set, TransactionTrait,
};

use super::entities::auth::{self, ActiveModel, Entity as AuthEntity};
use crate::domain::{Permission, PermissionView};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Permissions of one group ordered by id
    async fn list_by_group(&self, group_id: i32) -> AppResult<Vec<Permission>>;

    /// Permissions of several groups ordered by id
    async fn list_by_groups(&self, group_ids: Vec<i32>) -> AppResult<Vec<Permission>>;

    async fn find(&self, group_id: i32, auth: &str) -> AppResult<Option<Permission>>;

    async fn create(&self, group_id: i32, permission: PermissionView) -> AppResult<Permission>;

    /// Insert several permissions for a group in one transaction
    async fn create_many(&self, group_id: i32, permissions: Vec<PermissionView>) -> AppResult<()>;

    /// Delete the named permissions of a group, returning the number removed
    async fn delete_by_auths(&self, group_id: i32, auths: Vec<String>) -> AppResult<u64>;
}

pub struct PermissionStore {
    db: DatabaseConnection,
}

impl PermissionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_active_model(group_id: i32, permission: PermissionView) -> ActiveModel {
    ActiveModel {
        group_id: Set(group_id),
        auth: Set(permission.auth),
        module: Set(permission.module),
        ..Default::default()
    }
}

fn permissions_of_groups(group_ids: Vec<i32>) -> Select<AuthEntity> {
    AuthEntity::find()
        .filter(auth::Column::GroupId.is_in(group_ids))
        .order_by_asc(auth::Column::Id)
}

/// Only rows of `group_id` are touched, whatever other groups hold.
fn delete_group_permissions(group_id: i32, auths: Vec<String>) -> DeleteMany<AuthEntity> {
    AuthEntity::delete_many()
        .filter(auth::Column::GroupId.eq(group_id))
        .filter(auth::Column::Auth.is_in(auths))
}

#[async_trait]
impl PermissionRepository for PermissionStore {
    async fn list_by_group(&self, group_id: i32) -> AppResult<Vec<Permission>> {
        self.list_by_groups(vec![group_id]).await
    }

    async fn list_by_groups(&self, group_ids: Vec<i32>) -> AppResult<Vec<Permission>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = permissions_of_groups(group_ids)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Permission::from).collect())
    }

    async fn find(&self, group_id: i32, auth: &str) -> AppResult<Option<Permission>> {
        let result = AuthEntity::find()
            .filter(auth::Column::GroupId.eq(group_id))
            .filter(auth::Column::Auth.eq(auth))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Permission::from))
    }

    async fn create(&self, group_id: i32, permission: PermissionView) -> AppResult<Permission> {
        let model = to_active_model(group_id, permission)
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Permission::from(model))
    }

    async fn create_many(&self, group_id: i32, permissions: Vec<PermissionView>) -> AppResult<()> {
        if permissions.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await.map_err(AppError::from)?;
        let rows = permissions
            .into_iter()
            .map(|permission| to_active_model(group_id, permission));

        match AuthEntity::insert_many(rows).exec(&txn).await {
            Ok(_) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(AppError::from(e))
            }
        }
    }

    async fn delete_by_auths(&self, group_id: i32, auths: Vec<String>) -> AppResult<u64> {
        if auths.is_empty() {
            return Ok(0);
        }

        let result = delete_group_permissions(group_id, auths)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}
