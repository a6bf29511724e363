//! Domain types for the reference-service client.
//!
//! Everything here is a plain value: built fresh from a backend response,
//! immutable afterwards, and never persisted or cached.
//!
//! # Key Types
//!
//! - [`RepositoryHandle`] — Storage location plus repository coordinates
//! - [`RefName`] — Byte-sequence ref name with lossy display
//! - [`Branch`] / [`Tag`] — Prefix-stripped refs with their target commit
//! - [`Commit`] / [`PartialCommit`] — Full and subject-only commit metadata
//! - [`SortKey`] — Ordering accepted by local branch listings
//! - [`CoercedText`] — Result of best-effort UTF-8 coercion

pub mod branch;
pub mod commit;
pub mod error;
pub mod names;
pub mod repository;
pub mod sort;
pub mod text;

pub use branch::{Branch, BranchCommit, Tag};
pub use commit::{time_from_seconds, Commit, PartialCommit, Signature};
pub use error::TypeError;
pub use names::{
    branch_name, check_ref_format, tag_name, RefName, BRANCH_PREFIX, TAG_PREFIX,
};
pub use repository::RepositoryHandle;
pub use sort::SortKey;
pub use text::{coerce_utf8, CoercedText};
