//! The micro HTTP message model
//!
//! This crate provides value types for building and inspecting HTTP
//! exchanges independent of how they travel: a dual-mode byte stream used as
//! message body, a case-preserving header store, a normalizing URI, and the
//! request and response types composed from them. Thin codecs, an emitter
//! and a TCP transport connect the model to actual bytes.
//!
//! # Example
//!
//! ```
//! use micro_message::protocol::{HttpMessage, Request, Response};
//! use micro_message::stream::ByteStream;
//! use micro_message::uri::Uri;
//!
//! let uri = Uri::parse("http://API.example.com:8443/items?page=2").unwrap();
//! let request = Request::new("get", uri)
//!     .unwrap()
//!     .with_header("Accept", ["application/json"])
//!     .unwrap();
//!
//! assert_eq!(request.method(), http::Method::GET);
//! assert_eq!(request.header("host"), ["api.example.com:8443"]);
//! assert_eq!(request.request_target(), "/items?page=2");
//!
//! let mut response = Response::new(404).unwrap().with_body(ByteStream::new("missing"));
//! assert_eq!(response.reason_phrase(), "Not Found");
//! assert_eq!(response.body().to_text(), "missing");
//! ```
//!
//! # Architecture
//!
//! - [`stream`]: [`ByteStream`](stream::ByteStream), memory or handle backed
//! - [`header`]: [`HeaderBag`](header::HeaderBag), case-insensitive lookup with preserved casing
//! - [`uri`]: [`Uri`](uri::Uri), parsed and normalized URI values
//! - [`protocol`]: messages, requests, responses and server requests
//! - [`codec`]: HTTP/1.x encoders and decoders for the message types
//! - [`emitter`]: writes a response to an async sink
//! - [`transport`]: sends a request and returns the response
//! - [`error`]: the error types
//!
//! # Concurrency
//!
//! Messages and URIs are plain values. A [`ByteStream`](stream::ByteStream)
//! is an owned resource with exactly one owner at a time; hand it over with
//! [`detach`](stream::ByteStream::detach) or by moving it. Readers that need
//! concurrent access should copy the bytes out first.
//!
//! # Limitations
//!
//! - No TLS, connection pooling or HTTP/2 framing
//! - No chunked transfer coding
//! - Maximum response head size: 8KB
//! - Maximum number of headers: 64

pub mod codec;
pub mod emitter;
pub mod error;
pub mod header;
pub mod protocol;
pub mod stream;
pub mod transport;
pub mod uri;

mod utils;
pub(crate) use utils::ensure;
