//! Client side of an exchange: sending a [`Request`] and receiving a
//! [`Response`].
//!
//! [`Transport`] is the seam; [`TcpTransport`] is a minimal implementation
//! over plain TCP that opens one connection per request, sends
//! `Connection: close` and reads the response until the peer closes or the
//! declared `Content-Length` has arrived. TLS, pooling and chunked bodies
//! are out of its reach.
//!
//! [`Request`]: crate::protocol::Request
//! [`Response`]: crate::protocol::Response

mod config;
mod tcp;

pub use config::TransportConfig;
pub use tcp::TcpTransport;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::protocol::{Request, Response};

/// Turns a request into a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}
