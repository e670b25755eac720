//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::handlers::admin_route_metas;
use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::domain::PermissionRegistry;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

/// Registry with the admin routes plus any permissions listed in `permissions_file`.
pub fn build_registry(permissions_file: Option<&str>) -> AppResult<PermissionRegistry> {
    let mut registry = PermissionRegistry::new();
    registry.extend(admin_route_metas());

    if let Some(path) = permissions_file {
        let extra = PermissionRegistry::load_file(path)?;
        tracing::info!("Loaded {} permissions from {}", extra.len(), path);
        registry.extend(extra);
    }

    Ok(registry)
}

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    config.server_host = args.host;
    config.server_port = args.port;
    if args.permissions.is_some() {
        config.permissions_file = args.permissions;
    }

    let registry = Arc::new(build_registry(config.permissions_file.as_deref())?);

    let db = Arc::new(Database::connect(&config).await?);
    tracing::info!("Database connected");

    let addr = config.server_addr();
    let app_state = AppState::from_config(db, config, registry);
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
