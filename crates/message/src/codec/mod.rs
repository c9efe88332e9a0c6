//! Wire codecs between messages and HTTP/1.x bytes.
//!
//! All codecs implement the tokio-util [`Encoder`](tokio_util::codec::Encoder)
//! and [`Decoder`](tokio_util::codec::Decoder) traits over a
//! [`BytesMut`](bytes::BytesMut):
//!
//! - [`RequestEncoder`]: request line, headers and body of an outbound [`Request`](crate::protocol::Request)
//! - [`ResponseHeadDecoder`]: status line and headers of an inbound response
//! - [`RequestHeadDecoder`]: a complete inbound request into a [`ServerRequest`](crate::protocol::ServerRequest)
//! - [`ResponseHeadEncoder`]: status line and headers of an outbound [`Response`](crate::protocol::Response)
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_message::codec::ResponseHeadDecoder;
//! use micro_message::protocol::HttpMessage;
//! use tokio_util::codec::Decoder;
//!
//! let mut buf = BytesMut::from("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
//! let response = ResponseHeadDecoder::default().decode(&mut buf).unwrap().unwrap();
//! assert_eq!(response.status(), 404);
//! assert_eq!(response.header_line("content-length"), "0");
//! ```
//!
//! Chunked transfer coding is not supported in either direction.

mod request_encoder;
mod request_head_decoder;
mod response_head_decoder;
mod response_head_encoder;

pub use request_encoder::RequestEncoder;
pub use request_head_decoder::RequestHeadDecoder;
pub use response_head_decoder::MAX_HEADER_BYTES;
pub use response_head_decoder::MAX_HEADER_NUM;
pub use response_head_decoder::ResponseHeadDecoder;
pub use response_head_encoder::ResponseHeadEncoder;
