//! Passvote Client: transport boundary and signed action session.
//!
//! Provides:
//! - The async [`Transport`] trait with HTTP and in-memory implementations
//! - Wire request shapes for signed actions and votes
//! - [`SignedActionSession`], the nonce/deadline signing protocol

pub mod error;
pub mod memory;
pub mod requests;
pub mod session;
pub mod transport;

pub use error::{ClientError, TransportError};
pub use memory::InMemoryTransport;
pub use requests::{SignedEndpoint, SignedRequest, VoteRequest};
pub use session::SignedActionSession;
pub use transport::{HttpTransport, Transport};
