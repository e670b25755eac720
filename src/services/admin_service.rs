//! Admin service - user management, permission groups and permission dispatch.
//!
//! Every operation here is reachable only by super administrators; the
//! check happens in the `admin_required` middleware before a handler runs.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{
    Group, GroupWithPermissions, NewGroup, Password, Permission, PermissionRegistry,
    PermissionView, UpdateUserInfo, UserResponse,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, Paginated};

/// Admin service trait for dependency injection.
#[async_trait]
pub trait AdminService: Send + Sync {
    /// Dispatchable permissions as `{module: {auth: [route names]}}`
    fn authorities(&self) -> BTreeMap<String, BTreeMap<String, Vec<String>>>;

    /// Page of common users, optionally restricted to one group
    async fn get_users(
        &self,
        group_id: Option<i32>,
        page: Page,
    ) -> AppResult<Paginated<UserResponse>>;

    async fn change_user_password(&self, id: i32, new_password: String) -> AppResult<()>;

    /// Soft delete a user; super administrators are protected
    async fn delete_user(&self, id: i32) -> AppResult<()>;

    async fn update_user_info(&self, id: i32, info: UpdateUserInfo) -> AppResult<()>;

    /// Page of groups with their permissions; NotFound when there are none
    async fn get_groups(&self, page: Page) -> AppResult<Paginated<GroupWithPermissions>>;

    async fn get_all_groups(&self) -> AppResult<Vec<Group>>;

    async fn get_group(&self, id: i32) -> AppResult<GroupWithPermissions>;

    /// Create a group with its permissions.
    ///
    /// Returns `false` when the write itself failed and nothing was stored.
    async fn create_group(&self, group: NewGroup) -> AppResult<bool>;

    async fn update_group(&self, id: i32, name: String, info: Option<String>) -> AppResult<()>;

    async fn delete_group(&self, id: i32) -> AppResult<()>;

    async fn dispatch_permission(&self, group_id: i32, auth: String) -> AppResult<()>;

    async fn dispatch_permissions(&self, group_id: i32, auths: Vec<String>) -> AppResult<()>;

    async fn remove_permissions(&self, group_id: i32, auths: Vec<String>) -> AppResult<()>;
}

/// Concrete implementation of AdminService using Unit of Work.
pub struct AdminManager<U: UnitOfWork> {
    uow: Arc<U>,
    registry: Arc<PermissionRegistry>,
}

impl<U: UnitOfWork> AdminManager<U> {
    pub fn new(uow: Arc<U>, registry: Arc<PermissionRegistry>) -> Self {
        Self { uow, registry }
    }

    async fn require_group(&self, id: i32) -> AppResult<Group> {
        self.uow
            .groups()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Group not found")
    }

    /// Look up each auth in the registry, keeping the first occurrence of duplicates.
    fn resolve_permissions(&self, auths: &[String]) -> AppResult<Vec<PermissionView>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(auths.len());

        for auth in auths {
            if !seen.insert(auth.as_str()) {
                continue;
            }
            let meta = self.registry.find_by_auth(auth).ok_or_else(|| {
                AppError::not_found(format!(
                    "Cannot assign a permission that does not exist: {}",
                    auth
                ))
            })?;
            resolved.push(PermissionView {
                module: meta.module.clone(),
                auth: meta.auth.clone(),
            });
        }

        Ok(resolved)
    }
}

fn attach_permissions(
    groups: Vec<Group>,
    permissions: Vec<Permission>,
) -> Vec<GroupWithPermissions> {
    let mut by_group: HashMap<i32, Vec<Permission>> = HashMap::new();
    for permission in permissions {
        by_group.entry(permission.group_id).or_default().push(permission);
    }

    groups
        .into_iter()
        .map(|group| {
            let permissions = by_group.remove(&group.id).unwrap_or_default();
            GroupWithPermissions::new(group, &permissions)
        })
        .collect()
}

#[async_trait]
impl<U: UnitOfWork> AdminService for AdminManager<U> {
    fn authorities(&self) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
        self.registry.authorities()
    }

    async fn get_users(
        &self,
        group_id: Option<i32>,
        page: Page,
    ) -> AppResult<Paginated<UserResponse>> {
        let users = self.uow.users();
        let (rows, total) = tokio::try_join!(
            users.list_common(group_id, page.start, page.count),
            users.count_common(group_id),
        )?;

        let collection = rows
            .into_iter()
            .map(|(user, group_name)| UserResponse::new(user, group_name))
            .collect();

        Ok(Paginated::new(collection, total))
    }

    async fn change_user_password(&self, id: i32, new_password: String) -> AppResult<()> {
        let users = self.uow.users();
        users.find_by_id(id).await?.ok_or_not_found("User not found")?;

        let password_hash = Password::new(&new_password)?.into_string();
        users.update_password(id, password_hash).await?;

        tracing::info!(user_id = id, "Password reset by administrator");
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> AppResult<()> {
        let users = self.uow.users();
        let user = users.find_by_id(id).await?.ok_or_not_found("User not found")?;

        if user.is_super() {
            return Err(AppError::forbidden("Super administrators cannot be deleted"));
        }

        users.soft_delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    async fn update_user_info(&self, id: i32, info: UpdateUserInfo) -> AppResult<()> {
        let users = self.uow.users();
        let user = users.find_by_id(id).await?.ok_or_not_found("User not found")?;
        self.require_group(info.group_id).await?;

        if let Some(email) = &info.email {
            if user.email.as_deref() != Some(email.as_str()) {
                if let Some(owner) = users.find_by_email(email).await? {
                    if owner.id != id {
                        return Err(AppError::forbidden("Email already exists"));
                    }
                }
            }
        }

        users.update_info(id, info.group_id, info.email).await?;
        Ok(())
    }

    async fn get_groups(&self, page: Page) -> AppResult<Paginated<GroupWithPermissions>> {
        let groups = self.uow.groups();
        let (rows, total) = tokio::try_join!(groups.list(page.start, page.count), groups.count())?;

        if total < 1 {
            return Err(AppError::not_found("No permission groups found"));
        }

        let ids = rows.iter().map(|group| group.id).collect();
        let permissions = self.uow.permissions().list_by_groups(ids).await?;

        Ok(Paginated::new(attach_permissions(rows, permissions), total))
    }

    async fn get_all_groups(&self) -> AppResult<Vec<Group>> {
        let groups = self.uow.groups().list_all().await?;
        if groups.is_empty() {
            return Err(AppError::not_found("No permission groups found"));
        }
        Ok(groups)
    }

    async fn get_group(&self, id: i32) -> AppResult<GroupWithPermissions> {
        let group = self.require_group(id).await?;
        let permissions = self.uow.permissions().list_by_group(id).await?;
        Ok(GroupWithPermissions::new(group, &permissions))
    }

    async fn create_group(&self, group: NewGroup) -> AppResult<bool> {
        let groups = self.uow.groups();
        if groups.find_by_name(&group.name).await?.is_some() {
            return Err(AppError::forbidden("Group name already exists"));
        }

        let permissions = self.resolve_permissions(&group.auths)?;

        match groups
            .create_with_permissions(group.name, group.info, permissions)
            .await
        {
            Ok(created) => {
                tracing::info!(group_id = created.id, "Group {} created", created.name);
                Ok(true)
            }
            Err(e) => match e.on_unique_violation("Group name already exists") {
                taken @ AppError::Forbidden(_) => Err(taken),
                e => {
                    tracing::error!("Failed to create group: {:?}", e);
                    Ok(false)
                }
            },
        }
    }

    async fn update_group(&self, id: i32, name: String, info: Option<String>) -> AppResult<()> {
        self.require_group(id).await?;

        let groups = self.uow.groups();
        if let Some(existing) = groups.find_by_name(&name).await? {
            if existing.id != id {
                return Err(AppError::forbidden("Group name already exists"));
            }
        }

        groups
            .update(id, name, info)
            .await
            .map_err(|e| e.on_unique_violation("Group name already exists"))?;
        Ok(())
    }

    async fn delete_group(&self, id: i32) -> AppResult<()> {
        self.require_group(id).await?;

        if self.uow.users().exists_in_group(id).await? {
            return Err(AppError::forbidden(
                "Group still has users and cannot be deleted",
            ));
        }

        self.uow.groups().delete_with_permissions(id).await?;
        tracing::info!(group_id = id, "Group deleted");
        Ok(())
    }

    async fn dispatch_permission(&self, group_id: i32, auth: String) -> AppResult<()> {
        self.require_group(group_id).await?;

        let permissions = self.uow.permissions();
        if permissions.find(group_id, &auth).await?.is_some() {
            return Err(AppError::forbidden("Permission already assigned"));
        }

        let mut resolved = self.resolve_permissions(std::slice::from_ref(&auth))?;
        if let Some(permission) = resolved.pop() {
            permissions
                .create(group_id, permission)
                .await
                .map_err(|e| e.on_unique_violation("Permission already assigned"))?;
        }
        Ok(())
    }

    async fn dispatch_permissions(&self, group_id: i32, auths: Vec<String>) -> AppResult<()> {
        self.require_group(group_id).await?;

        let resolved = self.resolve_permissions(&auths)?;
        let permissions = self.uow.permissions();
        let assigned: HashSet<String> = permissions
            .list_by_group(group_id)
            .await?
            .into_iter()
            .map(|permission| permission.auth)
            .collect();

        let missing: Vec<PermissionView> = resolved
            .into_iter()
            .filter(|permission| !assigned.contains(&permission.auth))
            .collect();

        permissions
            .create_many(group_id, missing)
            .await
            .map_err(|e| e.on_unique_violation("Permission already assigned"))
    }

    async fn remove_permissions(&self, group_id: i32, auths: Vec<String>) -> AppResult<()> {
        self.require_group(group_id).await?;

        let removed = self.uow.permissions().delete_by_auths(group_id, auths).await?;
        tracing::debug!(group_id, removed, "Permissions removed");
        Ok(())
    }
}
