//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
mod group_repository;
mod permission_repository;
mod user_repository;

pub use group_repository::{GroupRepository, GroupStore};
pub use permission_repository::{PermissionRepository, PermissionStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use group_repository::MockGroupRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use permission_repository::MockPermissionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
