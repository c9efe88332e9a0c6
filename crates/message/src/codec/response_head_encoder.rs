//! Serializes the status line and header block of a [`Response`].
//!
//! Each header value goes on its own line under the exact casing the
//! [`HeaderBag`](crate::header::HeaderBag) stored. No framing headers are
//! added; the caller decides about `Content-Length`.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::error::EmitError;
use crate::header::HeaderBag;
use crate::protocol::{HttpMessage, Response};

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseHeadEncoder;

impl Encoder<&Response> for ResponseHeadEncoder {
    type Error = EmitError;

    fn encode(&mut self, response: &Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        write_status_line(response, dst)?;
        write_headers(response.headers(), dst);
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// `HTTP/<version> <code>[ <reason>]\r\n`
pub(crate) fn write_status_line(response: &Response, dst: &mut BytesMut) -> io::Result<()> {
    write!(FastWrite(dst), "HTTP/{} {}", response.protocol_version(), response.status())?;
    if !response.reason_phrase().is_empty() {
        dst.put_u8(b' ');
        dst.put_slice(response.reason_phrase().as_bytes());
    }
    dst.put_slice(b"\r\n");
    Ok(())
}

/// One `Name: value\r\n` line per value, in bag order.
pub(crate) fn write_headers(headers: &HeaderBag, dst: &mut BytesMut) {
    for (name, values) in headers {
        for value in values {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
    }
}

/// Writes straight into a [`BytesMut`] whose capacity was reserved up front.
#[derive(Debug)]
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ProtocolVersion;
    use indoc::indoc;

    #[test]
    fn status_line_and_headers() {
        let response = Response::new(404)
            .unwrap()
            .with_header("Content-Type", ["text/plain"])
            .unwrap()
            .with_added_header("Set-Cookie", ["a=1", "b=2"])
            .unwrap();

        let mut dst = BytesMut::new();
        ResponseHeadEncoder.encode(&response, &mut dst).unwrap();

        let expected = indoc! {"
            HTTP/1.1 404 Not Found\r
            Content-Type: text/plain\r
            Set-Cookie: a=1\r
            Set-Cookie: b=2\r
            \r
        "};
        assert_eq!(std::str::from_utf8(&dst).unwrap(), expected);
    }

    #[test]
    fn empty_reason_is_omitted() {
        let response = Response::new(299).unwrap().with_protocol_version("1.0").unwrap();
        assert_eq!(response.protocol_version(), ProtocolVersion::Http10);

        let mut dst = BytesMut::new();
        ResponseHeadEncoder.encode(&response, &mut dst).unwrap();
        assert_eq!(&dst[..], b"HTTP/1.0 299\r\n\r\n");
    }

    #[test]
    fn keeps_stored_casing() {
        let response = Response::default().with_header("x-request-ID", ["42"]).unwrap();

        let mut dst = BytesMut::new();
        ResponseHeadEncoder.encode(&response, &mut dst).unwrap();
        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\nx-request-ID: 42\r\n\r\n");
    }
}
