//! Service Container - Centralized service access.
//!
//! Owns one instance of every application service and hands out
//! trait objects, so handlers depend on service traits only.

use std::sync::Arc;

use super::{AdminService, AuthService};
use crate::config::Config;
use crate::domain::PermissionRegistry;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get admin service
    fn admin(&self) -> Arc<dyn AdminService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    admin_service: Arc<dyn AdminService>,
}

impl Services {
    pub fn new(auth_service: Arc<dyn AuthService>, admin_service: Arc<dyn AdminService>) -> Self {
        Self {
            auth_service,
            admin_service,
        }
    }

    /// Create service container from database connection, config and the
    /// permission registry built at start-up
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        registry: Arc<PermissionRegistry>,
    ) -> Self {
        use super::{AdminManager, Authenticator};

        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), config));
        let admin_service = Arc::new(AdminManager::new(uow, registry));

        Self {
            auth_service,
            admin_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn admin(&self) -> Arc<dyn AdminService> {
        self.admin_service.clone()
    }
}
