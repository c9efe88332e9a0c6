//! Writing a [`Response`](crate::protocol::Response) to an output channel.
//!
//! The [`Emitter`] writes the status line `HTTP/<version> <code>[ <reason>]`,
//! every header value on its own line, a blank line, and then the body. The
//! body goes out in one write, or in reads of
//! [`buffer_length`](EmitterConfig::buffer_length) bytes when one is
//! configured. In the buffered case a `Content-Range: bytes <first>-<last>/<len>`
//! header limits the body to that range.

mod config;
mod content_range;
mod response_emitter;

pub use config::EmitterConfig;
pub use content_range::ContentRange;
pub use response_emitter::Emitter;
