//! Client for the remote reference service.
//!
//! [`RefClient`] turns domain-level ref operations (list branches, find a
//! branch, create a branch, check a ref, ...) into calls on a
//! [`Transport`](refsvc_transport::Transport) and decodes the wire responses
//! into the value types of [`refsvc_types`].
//!
//! The client holds no mutable state: one immutable repository handle, the
//! per-call options, and the transport. Every operation is one round trip and
//! nothing is cached between calls.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;

pub use client::RefClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};

// Re-export key types
pub use refsvc_types::{
    Branch, BranchCommit, CoercedText, Commit, PartialCommit, RefName, RepositoryHandle,
    Signature, SortKey, Tag,
};
pub use refsvc_transport::{CallOptions, StatusCode, Transport, TransportError};
