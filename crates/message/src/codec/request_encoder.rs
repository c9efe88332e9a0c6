//! Serializes a [`Request`] into an HTTP/1.x request message.

use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::Method;
use http::header::CONTENT_LENGTH;
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::response_head_encoder::{FastWrite, write_headers};
use crate::error::TransportError;
use crate::protocol::{HttpMessage, Request};

const INIT_REQUEST_SIZE: usize = 4 * 1024;

/// Writes the request line, the header block and the whole body.
///
/// A `Content-Length` header is filled in when the body is non-empty or the
/// method usually carries one, unless the request already has it.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestEncoder;

impl Encoder<Request> for RequestEncoder {
    type Error = TransportError;

    fn encode(&mut self, mut request: Request, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut body = request.take_body();
        if body.is_seekable() {
            body.rewind()?;
        }
        let payload = body.contents()?;

        let target = request.request_target();
        let (mut message, method, _uri, _target) = request.into_parts();

        let wants_length = !payload.is_empty() || matches!(method, Method::POST | Method::PUT | Method::PATCH);
        if wants_length && !message.headers().has(CONTENT_LENGTH.as_str()) {
            message.headers_mut().insert("Content-Length", &payload.len().to_string())?;
        }

        dst.reserve(INIT_REQUEST_SIZE + payload.len());
        write!(FastWrite(dst), "{} {} HTTP/{}\r\n", method, target, message.version())?;
        write_headers(message.headers(), dst);
        dst.put_slice(b"\r\n");
        dst.put_slice(&payload);

        trace!(%method, %target, body_size = payload.len(), "encoded request");
        Ok(())
    }
}
