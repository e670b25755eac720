//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion and reach the repositories through the Unit of Work.

mod admin_service;
mod auth_service;
pub mod container;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use admin_service::{AdminManager, AdminService};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
