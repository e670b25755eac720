//! Unit of Work pattern implementation.
//!
//! Centralizes access to the repositories behind one handle. Operations
//! that touch several tables (creating or deleting a group together with
//! its permissions, bulk permission inserts) open their own transaction
//! inside the repository.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    GroupRepository, GroupStore, PermissionRepository, PermissionStore, UserRepository, UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unit of Work trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get group repository
    fn groups(&self) -> Arc<dyn GroupRepository>;

    /// Get permission repository
    fn permissions(&self) -> Arc<dyn PermissionRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    group_repo: Arc<GroupStore>,
    permission_repo: Arc<PermissionStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            group_repo: Arc::new(GroupStore::new(db.clone())),
            permission_repo: Arc::new(PermissionStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn groups(&self) -> Arc<dyn GroupRepository> {
        self.group_repo.clone()
    }

    fn permissions(&self) -> Arc<dyn PermissionRepository> {
        self.permission_repo.clone()
    }
}
