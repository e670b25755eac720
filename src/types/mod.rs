//! Shared response and pagination types.

mod pagination;
mod response;

pub use pagination::{GroupPage, Page, Paginated, UserPage};
pub use response::{Envelope, Success, SUCCESS_CODE};
