//! Domain layer - Core business entities and logic
//!
//! Users, permission groups, the permissions granted to groups and the
//! registry of route metadata those permissions come from.

pub mod group;
pub mod password;
pub mod permission;
pub mod route_meta;
pub mod user;

pub use group::{Group, GroupWithPermissions, NewGroup};
pub use password::Password;
pub use permission::{format_permissions, Permission, PermissionView};
pub use route_meta::{PermissionRegistry, RouteMeta};
pub use user::{UpdateUserInfo, User, UserActive, UserAdmin, UserResponse};
