//! The HTTP message model.
//!
//! - [`Message`] holds what every message shares: a [`ProtocolVersion`], a
//!   [`HeaderBag`](crate::header::HeaderBag) and a lazily created
//!   [`ByteStream`](crate::stream::ByteStream) body.
//! - [`HttpMessage`] is the accessor and `with_*` surface implemented by
//!   [`Request`], [`Response`] and [`ServerRequest`].
//! - [`ServerRequest`] adds the server, cookie, query and attribute
//!   [`ParamBag`]s, a parsed body and [`UploadedFile`]s.
//!
//! Messages are values: `with_*` methods consume the message and return the
//! changed one. Only the body stream is a mutable resource, owned by exactly
//! one message at a time.

mod version;
pub use version::ProtocolVersion;

mod message;
pub use message::HttpMessage;
pub use message::Message;

mod request;
pub use request::Request;

mod status;
pub use status::reason_phrase_for;

mod response;
pub use response::Response;

mod params;
pub use params::ParamBag;

mod uploaded_file;
pub use uploaded_file::UploadStatus;
pub use uploaded_file::UploadedFile;

mod server_request;
pub use server_request::ServerRequest;
pub use server_request::parse_cookie_header;
