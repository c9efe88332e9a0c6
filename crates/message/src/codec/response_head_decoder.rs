//! Line based decoder for the status line and header block of a response.
//!
//! It is deliberately lenient, in the way a client-side header callback is:
//! the status line is matched case-insensitively as `HTTP/<version> <code>`,
//! header lines are split on their first `:`, values are trimmed of
//! surrounding whitespace and trailing `;`, and lines without a `:` are
//! skipped. Interim `1xx` heads (other than `101`) are dropped.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::error::DecodeError;
use crate::header::HeaderBag;
use crate::protocol::{HttpMessage, ProtocolVersion, Response};

/// Maximum number of headers allowed in a response head
pub const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for a response head
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct ResponseHeadDecoder {
    max_header_bytes: usize,
    max_headers: usize,
}

impl Default for ResponseHeadDecoder {
    fn default() -> Self {
        Self::new(MAX_HEADER_BYTES, MAX_HEADER_NUM)
    }
}

impl ResponseHeadDecoder {
    pub fn new(max_header_bytes: usize, max_headers: usize) -> Self {
        Self { max_header_bytes, max_headers }
    }

    fn parse_head(&self, head: &str) -> Result<Response, DecodeError> {
        let mut lines = head.split('\n').map(|line| line.trim_end_matches('\r')).skip_while(|line| line.is_empty());

        let status_line = lines.next().ok_or_else(|| DecodeError::invalid_status_line(""))?;
        let (version, status, reason) = parse_status_line(status_line)?;

        let mut headers = HeaderBag::new();
        let mut header_count = 0usize;
        for line in lines.filter(|line| !line.is_empty()) {
            let Some((name, value)) = line.split_once(':') else {
                trace!(line, "skip header line without colon");
                continue;
            };

            header_count += 1;
            ensure!(header_count <= self.max_headers, DecodeError::too_many_headers(self.max_headers));

            let value = value.trim().trim_end_matches(';').trim_end();
            headers
                .append(name.trim(), value)
                .map_err(|e| DecodeError::invalid_header(format!("{line:?}: {e}")))?;
        }

        Ok(Response::with_parts(status, headers, None, version, reason)?)
    }
}

/// Matches `HTTP/<version> <code>[ <reason>]`, ignoring the case of `HTTP`.
pub(crate) fn parse_status_line(line: &str) -> Result<(ProtocolVersion, u16, Option<&str>), DecodeError> {
    let invalid = || DecodeError::invalid_status_line(line);

    ensure!(line.get(..5).is_some_and(|prefix| prefix.eq_ignore_ascii_case("HTTP/")), invalid());
    let (version, rest) = line[5..].split_once(' ').ok_or_else(invalid)?;
    ensure!(!version.is_empty() && version.bytes().all(|b| matches!(b, b'.' | b'0'..=b'2')), invalid());

    let (code, reason) = match rest.split_once(' ') {
        Some((code, reason)) => (code, Some(reason.trim())),
        None => (rest.trim(), None),
    };
    ensure!(code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()), invalid());
    let code = code.parse::<u16>().map_err(|_| invalid())?;

    let version = ProtocolVersion::parse(version)?;
    Ok((version, code, reason.filter(|reason| !reason.is_empty())))
}

/// Offset just past the blank line ending the head, if it has arrived.
fn find_head_end(src: &[u8]) -> Option<usize> {
    let crlf = src.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4);
    let lf = src.windows(2).position(|w| w == b"\n\n").map(|i| i + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn is_interim(status: u16) -> bool {
    (100..200).contains(&status) && status != 101
}

impl Decoder for ResponseHeadDecoder {
    type Item = Response;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(head_end) = find_head_end(src) else {
                ensure!(src.len() <= self.max_header_bytes, DecodeError::too_large_header(src.len(), self.max_header_bytes));
                return Ok(None);
            };
            ensure!(head_end <= self.max_header_bytes, DecodeError::too_large_header(head_end, self.max_header_bytes));

            let response = {
                let head = String::from_utf8_lossy(&src[..head_end]);
                self.parse_head(&head)?
            };
            src.advance(head_end);

            if is_interim(response.status()) {
                trace!(status = response.status(), "skip interim response head");
                continue;
            }

            trace!(status = response.status(), header_count = response.headers().len(), "decoded response head");
            return Ok(Some(response));
        }
    }
}
