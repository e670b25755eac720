//! Route id extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::errors::{AppError, AppResult};

/// Positive integer taken from the `:id` route segment.
///
/// Anything else is rejected with "Invalid route parameter" before the
/// handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeId(pub i32);

/// Parse a route segment into an id `>= 1`.
pub fn parse_id(raw: &str) -> AppResult<i32> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::parameters("Invalid route parameter")),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SafeId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::parameters("Invalid route parameter"))?;

        parse_id(&raw).map(SafeId)
    }
}
