//! Core types shared across colltrack crates
//!
//! - **Correlation types**: RequestId, RunId, RequestContext
//! - **Schema constants**: canonical field keys and event names for structured logging

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, RunId};
