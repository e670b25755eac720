//! Lin CMS admin service
//!
//! Administrative routes of a Lin CMS style backend: user management,
//! permission groups and permission dispatch, served under `/cms/admin`
//! to super administrators only.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, groups, permissions and the route registry
//! - **services**: Application use cases and business logic
//! - **infra**: Database, migrations and repositories
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, response envelopes)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply migrations and create the first administrator
//! lin-cms-admin migrate up
//! lin-cms-admin admin create --nickname root --password 123456
//!
//! # Get a token and start the server
//! lin-cms-admin admin token --user-id 1
//! lin-cms-admin serve --permissions permissions.json
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, PermissionRegistry, User, UserAdmin};
pub use errors::{AppError, AppResult};
