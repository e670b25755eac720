//! JWT authentication middleware for administrator routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::errors::AppError;

/// Authenticated administrator resolved from the access token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub nickname: String,
}

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::auth_failed("Authentication failed, please provide a valid token"))
}

/// Require a super administrator.
///
/// Validates the bearer token, loads the user it identifies and injects
/// the CurrentUser into the request extensions.
pub async fn admin_required(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?.to_string();
    let user = state.auth_service.authenticate(&token).await?;

    if !user.is_super() {
        tracing::debug!(user_id = user.id, "Rejected non super administrator");
        return Err(AppError::auth_failed(
            "Only super administrators may perform this operation",
        ));
    }

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        nickname: user.nickname,
    });

    Ok(next.run(request).await)
}
