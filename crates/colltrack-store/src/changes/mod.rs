//! Change record persistence layer.
//!
//! Records are written in bulk per comparison run and read back through a
//! [`ChangeFilter`](colltrack_core::collaborators::ChangeFilter) with paging.

pub mod persist;
pub mod query;

pub use persist::insert_changes;
pub use query::query_changes;
