//! Permission group entity.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::permission::{format_permissions, Permission, PermissionView};

/// Permission group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Group {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "editors")]
    pub name: String,
    #[schema(example = "Can edit articles")]
    pub info: Option<String>,
}

/// Data needed to create a group together with its permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
    pub info: Option<String>,
    pub auths: Vec<String>,
}

/// Group with its permissions grouped by module
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupWithPermissions {
    pub id: i32,
    pub name: String,
    pub info: Option<String>,
    /// `[{"<module>": [{"module": .., "auth": ..}]}]`
    #[schema(value_type = Vec<Object>)]
    pub auths: Vec<BTreeMap<String, Vec<PermissionView>>>,
}

impl GroupWithPermissions {
    pub fn new(group: Group, permissions: &[Permission]) -> Self {
        Self {
            id: group.id,
            name: group.name,
            info: group.info,
            auths: format_permissions(permissions),
        }
    }
}
