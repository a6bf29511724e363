//! Wire protocol for the reference service.
//!
//! Defines the request and response records exchanged with the backend git
//! service. The records are serde-serializable and framework-neutral: any RPC
//! stack that can carry them can sit behind the transport.

pub mod error;
pub mod message;
pub mod method;
pub mod record;

pub use error::ProtocolError;
pub use message::{CreateBranchStatus, RefRequest, RefResponse};
pub use method::{services, Method};
pub use record::{BranchRecord, CommitAuthor, FullCommitRecord, PartialCommitRecord, TagRecord};
