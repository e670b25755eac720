//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::{Config, DEFAULT_PAGE_COUNT, MAX_PAGE_COUNT};
use crate::domain::PermissionRegistry;
use crate::infra::Database;
use crate::services::{AdminService, AuthService, ServiceContainer, Services};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Admin service
    pub admin_service: Arc<dyn AdminService>,
    /// Database connection
    pub database: Arc<Database>,
    /// Page size used when a list request has no `count`
    pub page_count_default: u64,
    /// Largest page size a list request may ask for
    pub page_count_max: u64,
}

impl AppState {
    /// Create application state from database connection, config and the
    /// permission registry.
    pub fn from_config(
        database: Arc<Database>,
        config: Config,
        registry: Arc<PermissionRegistry>,
    ) -> Self {
        let (page_count_default, page_count_max) =
            (config.page_count_default, config.page_count_max);
        let container = Services::from_connection(database.get_connection(), config, registry);

        Self::from_container(&container, database)
            .with_page_limits(page_count_default, page_count_max)
    }

    /// Take the services out of a container.
    pub fn from_container(container: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self::new(container.auth(), container.admin(), database)
    }

    /// Create new application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        admin_service: Arc<dyn AdminService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            admin_service,
            database,
            page_count_default: DEFAULT_PAGE_COUNT,
            page_count_max: MAX_PAGE_COUNT,
        }
    }

    pub fn with_page_limits(mut self, default_count: u64, max_count: u64) -> Self {
        self.page_count_max = max_count;
        self.page_count_default = default_count.min(max_count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DatabaseConnection;

    use crate::infra::{MockUnitOfWork, Persistence};
    use crate::services::{AdminManager, Authenticator, MockServiceContainer};

    #[test]
    fn test_from_container_uses_container_services() {
        let uow = Arc::new(MockUnitOfWork::new());
        let auth: Arc<dyn AuthService> = Arc::new(Authenticator::new(
            uow.clone(),
            Config::new("postgres://localhost/test", "test-secret-key-minimum-32-chars!!"),
        ));
        let admin: Arc<dyn AdminService> =
            Arc::new(AdminManager::new(uow, Arc::new(PermissionRegistry::new())));

        let mut container = MockServiceContainer::new();
        let auth_clone = auth.clone();
        container.expect_auth().times(1).returning(move || auth_clone.clone());
        container.expect_admin().times(1).returning(move || admin.clone());

        let database = Arc::new(Database::from_connection(DatabaseConnection::default()));
        let state = AppState::from_container(&container, database);

        assert!(Arc::ptr_eq(&state.auth_service, &auth));
        assert_eq!(state.page_count_default, 10);
        assert_eq!(state.page_count_max, 50);
    }

    #[test]
    fn test_page_limits_keep_default_under_max() {
        let database = Arc::new(Database::from_connection(DatabaseConnection::default()));
        let uow = Arc::new(Persistence::new(DatabaseConnection::default()));
        let state = AppState::new(
            Arc::new(Authenticator::new(
                uow.clone(),
                Config::new("postgres://localhost/test", "test-secret-key-minimum-32-chars!!"),
            )),
            Arc::new(AdminManager::new(uow, Arc::new(PermissionRegistry::new()))),
            database,
        )
        .with_page_limits(30, 20);

        assert_eq!(state.page_count_default, 20);
        assert_eq!(state.page_count_max, 20);
    }
}
