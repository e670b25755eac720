//! User repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, SelectTwo, Set,
};

use super::entities::group::Entity as GroupEntity;
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{USER_ACTIVE, USER_ADMIN_COMMON};
use crate::domain::{User, UserAdmin};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Every query excludes soft-deleted users, except the nickname lookup: the
/// nickname index spans deleted rows too.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find live user by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    /// Find live user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find any user, soft-deleted or not, by nickname
    async fn find_by_nickname(&self, nickname: &str) -> AppResult<Option<User>>;

    /// Page of common (non super) users with their group name
    async fn list_common(
        &self,
        group_id: Option<i32>,
        start: u64,
        count: u64,
    ) -> AppResult<Vec<(User, Option<String>)>>;

    /// Number of common users, optionally restricted to a group
    async fn count_common(&self, group_id: Option<i32>) -> AppResult<u64>;

    /// Whether any live user belongs to the group
    async fn exists_in_group(&self, group_id: i32) -> AppResult<bool>;

    /// Create a new user
    async fn create(
        &self,
        nickname: String,
        password_hash: String,
        email: Option<String>,
        admin: UserAdmin,
        group_id: Option<i32>,
    ) -> AppResult<User>;

    /// Replace the password hash of a live user
    async fn update_password(&self, id: i32, password_hash: String) -> AppResult<()>;

    /// Move a live user to another group and optionally change the email
    async fn update_info(&self, id: i32, group_id: i32, email: Option<String>) -> AppResult<User>;

    /// Soft delete user by ID (sets delete_time)
    async fn soft_delete(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of UserRepository with soft delete
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_live_model(&self, id: i32) -> AppResult<user::Model> {
        live_users()
            .filter(user::Column::Id.eq(id))
            .one(&self.db)
            .await?
            .ok_or_not_found("User not found")
    }
}

fn live_users() -> Select<UserEntity> {
    UserEntity::find().filter(user::Column::DeleteTime.is_null())
}

fn live_users_in_group(group_id: i32) -> Select<UserEntity> {
    live_users().filter(user::Column::GroupId.eq(group_id))
}

fn live_common_users(group_id: Option<i32>) -> Select<UserEntity> {
    let query = live_users().filter(user::Column::Admin.eq(USER_ADMIN_COMMON));

    match group_id {
        Some(group_id) => query.filter(user::Column::GroupId.eq(group_id)),
        None => query,
    }
}

fn common_users_page(
    group_id: Option<i32>,
    start: u64,
    count: u64,
) -> SelectTwo<UserEntity, GroupEntity> {
    live_common_users(group_id)
        .find_also_related(GroupEntity)
        .order_by_asc(user::Column::Id)
        .offset(start)
        .limit(count)
}

fn users_with_nickname(nickname: &str) -> Select<UserEntity> {
    UserEntity::find().filter(user::Column::Nickname.eq(nickname))
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let result = live_users()
            .filter(user::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = live_users()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_nickname(&self, nickname: &str) -> AppResult<Option<User>> {
        let result = users_with_nickname(nickname)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn list_common(
        &self,
        group_id: Option<i32>,
        start: u64,
        count: u64,
    ) -> AppResult<Vec<(User, Option<String>)>> {
        let rows = common_users_page(group_id, start, count)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows
            .into_iter()
            .map(|(user, group)| (User::from(user), group.map(|g| g.name)))
            .collect())
    }

    async fn count_common(&self, group_id: Option<i32>) -> AppResult<u64> {
        live_common_users(group_id)
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn exists_in_group(&self, group_id: i32) -> AppResult<bool> {
        let count = live_users_in_group(group_id)
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn create(
        &self,
        nickname: String,
        password_hash: String,
        email: Option<String>,
        admin: UserAdmin,
        group_id: Option<i32>,
    ) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            nickname: Set(nickname),
            admin: Set(admin.as_i16()),
            active: Set(USER_ACTIVE),
            email: Set(email),
            group_id: Set(group_id),
            password: Set(password_hash),
            create_time: Set(now),
            update_time: Set(now),
            delete_time: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn update_password(&self, id: i32, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = self.find_live_model(id).await?.into();
        active.password = Set(password_hash);
        active.update_time = Set(chrono::Utc::now());

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn update_info(&self, id: i32, group_id: i32, email: Option<String>) -> AppResult<User> {
        let mut active: ActiveModel = self.find_live_model(id).await?.into();
        active.group_id = Set(Some(group_id));
        if let Some(email) = email {
            active.email = Set(Some(email));
        }
        active.update_time = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let mut active: ActiveModel = self.find_live_model(id).await?.into();
        let now = chrono::Utc::now();
        active.delete_time = Set(Some(now));
        active.update_time = Set(now);

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }
}
