//! Transport seam for the reference service.
//!
//! The client never talks to the network itself. It hands a typed request to a
//! [`Transport`], which performs the round trip and returns either one
//! response or a lazy stream of response chunks. Framing, connection
//! management, deadlines and retries all live behind this trait.
//!
//! # Modules
//!
//! - [`error`] — [`TransportError`] and gRPC-style [`StatusCode`]s
//! - [`options`] — Per-call [`CallOptions`] (deadline)
//! - [`transport`] — The [`Transport`] trait
//! - [`counting`] — [`CountingTransport`], a call-recording wrapper
//! - [`memory`] — [`MemoryBackend`], an in-process reference service for tests

pub mod counting;
pub mod error;
pub mod memory;
pub mod options;
pub mod transport;

pub use counting::{CountingTransport, RecordedCall};
pub use error::{StatusCode, TransportError, TransportResult};
pub use memory::MemoryBackend;
pub use options::CallOptions;
pub use transport::{ResponseStream, Transport};
