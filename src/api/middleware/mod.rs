//! API middleware.

mod auth;
mod request_url;

pub use auth::{admin_required, CurrentUser};
pub use request_url::stamp_request_url;
