//! OData query building
//!
//! Structured filters and system query options rendered to the OData v2
//! query string. Literal escaping happens here, never in callers.

pub mod filters;
pub mod orderby;
pub mod query;

pub use filters::{Filter, FilterValue};
pub use orderby::OrderBy;
pub use query::Query;
