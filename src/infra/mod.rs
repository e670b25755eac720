//! Infrastructure layer - External systems integration
//!
//! Database connection, migrations, repositories and the Unit of Work
//! that hands them to the services.

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    GroupRepository, GroupStore, PermissionRepository, PermissionStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockGroupRepository, MockPermissionRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
