//! Pagination types for list endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{DEFAULT_PAGE_NUMBER, MAX_PAGE_OFFSET};
use crate::domain::{GroupWithPermissions, UserResponse};
use crate::errors::{AppError, AppResult};

/// Offset window resolved from the `count` and `page` query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Number of rows to skip
    pub start: u64,
    /// Number of rows to return
    pub count: u64,
}

impl Page {
    /// Resolve `count` / `page` query values.
    ///
    /// Missing or empty values fall back to the defaults, `count` is capped at
    /// `max_count`. Anything that is not a non-negative integer is rejected,
    /// as is a page whose offset does not fit a Postgres `OFFSET`.
    pub fn resolve(
        count: Option<&str>,
        page: Option<&str>,
        default_count: u64,
        max_count: u64,
    ) -> AppResult<Self> {
        let count = parse_query_number(count, "count")?
            .unwrap_or(default_count)
            .min(max_count);
        let page = parse_query_number(page, "page")?.unwrap_or(DEFAULT_PAGE_NUMBER);
        let start = page
            .checked_mul(count)
            .filter(|start| *start <= MAX_PAGE_OFFSET)
            .ok_or_else(|| AppError::parameters("page is out of range"))?;

        Ok(Self { start, count })
    }
}

fn parse_query_number(value: Option<&str>, name: &str) -> AppResult<Option<u64>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| AppError::parameters(format!("{} must be a non-negative integer", name))),
    }
}

/// Paginated response body: `{collection, total_nums}`
#[derive(Debug, Serialize, ToSchema)]
#[aliases(UserPage = Paginated<UserResponse>, GroupPage = Paginated<GroupWithPermissions>)]
pub struct Paginated<T> {
    pub collection: Vec<T>,
    pub total_nums: u64,
}

impl<T> Paginated<T> {
    pub fn new(collection: Vec<T>, total_nums: u64) -> Self {
        Self {
            collection,
            total_nums,
        }
    }
}
