//! Query string extractors for list endpoints.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use crate::api::AppState;
use crate::errors::{AppError, AppResult};
use crate::types::Page;

async fn query_params<S>(parts: &mut Parts, state: &S) -> AppResult<HashMap<String, String>>
where
    S: Send + Sync,
{
    let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .map_err(|e| AppError::parameters(e.body_text()))?;
    Ok(params)
}

/// `count` / `page` window resolved against the configured page limits
#[derive(Debug, Clone, Copy)]
pub struct Pagination(pub Page);

#[async_trait]
impl FromRequestParts<AppState> for Pagination {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let params = query_params(parts, state).await?;

        Page::resolve(
            params.get("count").map(String::as_str),
            params.get("page").map(String::as_str),
            state.page_count_default,
            state.page_count_max,
        )
        .map(Pagination)
    }
}

/// Optional `group_id` filter; empty means no filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupFilter(pub Option<i32>);

fn parse_group_id(raw: Option<&str>) -> AppResult<Option<i32>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match value.parse::<i32>() {
            Ok(id) if id >= 1 => Ok(Some(id)),
            _ => Err(AppError::parameters("group_id must be a positive integer")),
        },
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for GroupFilter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = query_params(parts, state).await?;
        parse_group_id(params.get("group_id").map(String::as_str)).map(GroupFilter)
    }
}
