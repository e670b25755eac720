//! Route metadata and the registry of dispatchable permissions.
//!
//! Every route is registered with the permission (`auth`) guarding it and the
//! module that permission belongs to. Only mounted routes can be granted to
//! groups; administrative routes are registered unmounted.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Metadata attached to a single route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMeta {
    /// Unique route name, e.g. `getAdminUsers`
    pub name: String,
    /// Permission name
    pub auth: String,
    /// Permission module
    pub module: String,
    /// Whether the permission can be dispatched to groups
    #[serde(default = "mounted_by_default")]
    pub mount: bool,
}

fn mounted_by_default() -> bool {
    true
}

impl RouteMeta {
    pub fn new(
        name: impl Into<String>,
        auth: impl Into<String>,
        module: impl Into<String>,
        mount: bool,
    ) -> Self {
        Self {
            name: name.into(),
            auth: auth.into(),
            module: module.into(),
            mount,
        }
    }
}

/// Registry of route metadata, built once at start-up
#[derive(Debug, Clone, Default)]
pub struct PermissionRegistry {
    routes: Vec<RouteMeta>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route; a later registration with the same name wins.
    pub fn register(&mut self, meta: RouteMeta) {
        match self.routes.iter_mut().find(|r| r.name == meta.name) {
            Some(existing) => *existing = meta,
            None => self.routes.push(meta),
        }
    }

    pub fn extend(&mut self, metas: impl IntoIterator<Item = RouteMeta>) {
        for meta in metas {
            self.register(meta);
        }
    }

    /// Parse a JSON array of route metadata.
    pub fn parse_json(json: &str) -> AppResult<Vec<RouteMeta>> {
        serde_json::from_str(json)
            .map_err(|e| AppError::internal(format!("Invalid permissions file: {}", e)))
    }

    /// Load extra route metadata from a JSON file.
    pub fn load_file(path: impl AsRef<Path>) -> AppResult<Vec<RouteMeta>> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::internal(format!("Cannot read permissions file {}: {}", path.display(), e))
        })?;
        Self::parse_json(&json)
    }

    pub fn routes(&self) -> &[RouteMeta] {
        &self.routes
    }

    /// Find the mounted route carrying the given permission.
    pub fn find_by_auth(&self, auth: &str) -> Option<&RouteMeta> {
        self.routes.iter().find(|r| r.mount && r.auth == auth)
    }

    /// Mounted permissions as `{module: {auth: [route names]}}`.
    pub fn authorities(&self) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
        let mut result: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for route in self.routes.iter().filter(|r| r.mount) {
            result
                .entry(route.module.clone())
                .or_default()
                .entry(route.auth.clone())
                .or_default()
                .push(route.name.clone());
        }
        result
    }
}
