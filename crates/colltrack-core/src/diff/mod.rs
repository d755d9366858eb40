//! Tree diff engine.
//!
//! Compares two decoded snapshots of a collection document and produces a
//! minimal, path-addressed list of `added`/`deleted`/`modified` changes.
//!
//! ## Entry point
//!
//! ```ignore
//! use colltrack_core::diff::{diff_documents, DiffOptions};
//!
//! let changes = diff_documents(old_bytes, new_bytes, &DiffOptions::default())?;
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: object keys are visited in sorted order, so identical
//!   inputs produce identical output.
//! - **Structural-first**: when keys or identity-array members appear or
//!   disappear anywhere, only those additions and deletions are reported.
//! - **No partial results**: a decode failure returns an error and nothing else.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{decode_document, diff, diff_documents, diff_with};
pub use human_summary::render_human_summary;
pub use model::{Change, ChangeType, DiffOptions};
