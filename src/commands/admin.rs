//! Admin command - super administrator accounts and access tokens.

use std::sync::Arc;

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::domain::UserAdmin;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Database, Persistence, UnitOfWork};
use crate::services::{AuthService, Authenticator};

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let uow = Arc::new(Persistence::new(db.get_connection()));
    let auth = Authenticator::new(uow.clone(), config);

    match args.action {
        AdminAction::Create {
            nickname,
            password,
            email,
        } => {
            let user = auth
                .register(nickname, password, email, UserAdmin::Super)
                .await?;
            println!("Created super administrator {} (id {})", user.nickname, user.id);
        }
        AdminAction::Token { user_id } => {
            let user = uow
                .users()
                .find_by_id(user_id)
                .await?
                .ok_or_not_found("User not found")?;
            let token = auth.issue_token(&user)?;
            tracing::info!(user_id, "Issued access token");
            println!("{}", token.access_token);
        }
    }

    Ok(())
}
