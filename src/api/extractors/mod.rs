//! Custom request extractors.

mod query;
mod safe_id;
mod validated_json;

pub use query::{GroupFilter, Pagination};
pub use safe_id::{parse_id, SafeId};
pub use validated_json::ValidatedJson;
