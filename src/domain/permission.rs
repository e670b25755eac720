//! Permissions assigned to groups.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

/// A permission row: `auth` of `module` granted to `group_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: i32,
    pub group_id: i32,
    pub auth: String,
    pub module: String,
}

/// Permission as shown inside a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PermissionView {
    pub module: String,
    pub auth: String,
}

/// Group permissions by module, one single-key object per module.
///
/// Modules keep the order in which they first appear.
pub fn format_permissions(
    permissions: &[Permission],
) -> Vec<BTreeMap<String, Vec<PermissionView>>> {
    let mut modules: Vec<(String, Vec<PermissionView>)> = Vec::new();

    for permission in permissions {
        let view = PermissionView {
            module: permission.module.clone(),
            auth: permission.auth.clone(),
        };
        match modules.iter_mut().find(|(module, _)| *module == permission.module) {
            Some((_, views)) => views.push(view),
            None => modules.push((permission.module.clone(), vec![view])),
        }
    }

    modules
        .into_iter()
        .map(|(module, views)| BTreeMap::from([(module, views)]))
        .collect()
}
