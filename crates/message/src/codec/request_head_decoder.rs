//! Decodes an inbound HTTP/1.x request into a [`ServerRequest`].
//!
//! The head is parsed with `httparse`. The body must be framed by
//! `Content-Length`; the decoder waits until all of it has arrived, so one
//! call yields one complete request.
//!
//! # Limits
//!
//! - Maximum number of headers: 64 by default
//! - Maximum head size: 8KB by default
//! - `Transfer-Encoding: chunked` is rejected

use bytes::{Buf, Bytes, BytesMut};
use httparse::{Error, Status};
use serde_json::Value;
use tokio_util::codec::Decoder;
use tracing::{trace, warn};

use crate::codec::response_head_decoder::{MAX_HEADER_BYTES, MAX_HEADER_NUM};
use crate::ensure;
use crate::error::DecodeError;
use crate::header::HeaderBag;
use crate::protocol::{ParamBag, ProtocolVersion, Request, ServerRequest};
use crate::stream::ByteStream;
use crate::uri::Uri;

#[derive(Debug, Clone, Copy)]
pub struct RequestHeadDecoder {
    max_header_bytes: usize,
    max_headers: usize,
}

impl Default for RequestHeadDecoder {
    fn default() -> Self {
        Self::new(MAX_HEADER_BYTES, MAX_HEADER_NUM)
    }
}

/// The owned parts of a parsed head, taken out before `src` is split.
struct Head {
    method: String,
    target: String,
    version: ProtocolVersion,
    headers: HeaderBag,
    len: usize,
}

impl RequestHeadDecoder {
    pub fn new(max_header_bytes: usize, max_headers: usize) -> Self {
        Self { max_header_bytes, max_headers }
    }

    fn parse_head(&self, src: &[u8]) -> Result<Option<Head>, DecodeError> {
        let mut raw_headers = vec![httparse::EMPTY_HEADER; self.max_headers];
        let mut req = httparse::Request::new(&mut raw_headers);

        let status = req.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => DecodeError::too_many_headers(self.max_headers),
            e => DecodeError::invalid_header(e.to_string()),
        })?;

        let len = match status {
            Status::Complete(len) => len,
            Status::Partial => {
                ensure!(src.len() <= self.max_header_bytes, DecodeError::too_large_header(src.len(), self.max_header_bytes));
                return Ok(None);
            }
        };
        ensure!(len <= self.max_header_bytes, DecodeError::too_large_header(len, self.max_header_bytes));

        let method = req.method.ok_or_else(|| DecodeError::invalid_header("missing method"))?;
        let target = req.path.ok_or_else(|| DecodeError::invalid_header("missing request target"))?;
        let version = ProtocolVersion::try_from(req.version.unwrap_or(1))?;

        let mut headers = HeaderBag::new();
        for header in req.headers.iter() {
            let value = std::str::from_utf8(header.value)
                .map_err(|_| DecodeError::invalid_header(format!("value of header {} is not utf-8", header.name)))?;
            headers.append(header.name, value)?;
        }

        Ok(Some(Head { method: method.to_owned(), target: target.to_owned(), version, headers, len }))
    }
}

impl Decoder for RequestHeadDecoder {
    type Item = ServerRequest;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let Some(head) = self.parse_head(src)? else {
            return Ok(None);
        };

        let body_len = body_length(&head.headers)?;
        if src.len() < head.len + body_len {
            src.reserve(head.len + body_len - src.len());
            return Ok(None);
        }

        src.advance(head.len);
        let body = src.split_to(body_len).freeze();
        trace!(method = %head.method, target = %head.target, body_size = body_len, "decoded request");

        build_request(head, body).map(Some)
    }
}

fn build_request(head: Head, body: Bytes) -> Result<ServerRequest, DecodeError> {
    let Head { method, target, version, headers, .. } = head;

    let mut uri = Uri::parse(&target)?;
    if uri.host().is_empty() {
        if let Some(host) = headers.get("Host").first() {
            uri = with_authority(uri, host)?;
        }
    }

    let mut server_params = ParamBag::new();
    server_params.set("REQUEST_METHOD", method.clone());
    server_params.set("REQUEST_URI", target.clone());
    server_params.set("SERVER_PROTOCOL", format!("HTTP/{version}"));
    server_params.set("QUERY_STRING", uri.query().to_owned());

    let content_type = headers.get_line("Content-Type");
    let query = uri.query().to_owned();
    let parsed_body = parse_body(&content_type, &body);

    let mut request = Request::with_parts(&method, uri, headers, Some(ByteStream::from(body)), version)?;
    if target != request.request_target() {
        request = request.with_request_target(&target)?;
    }

    let request = ServerRequest::from_request(request, server_params).with_query_string(&query)?;
    match parsed_body {
        Some(parsed_body) => Ok(request.with_parsed_body(parsed_body)?),
        None => Ok(request),
    }
}

/// Completes an origin-form uri with the scheme and the `Host` header.
fn with_authority(uri: Uri, host: &str) -> Result<Uri, DecodeError> {
    let (name, port) = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (name, Some(port.parse::<u32>().map_err(|_| DecodeError::invalid_header(format!("invalid host {host:?}")))?))
        }
        _ => (host, None),
    };
    Ok(uri.with_scheme("http").with_host(name).with_port(port)?)
}

/// Size of the body announced by the head.
fn body_length(headers: &HeaderBag) -> Result<usize, DecodeError> {
    let transfer_encoding = headers.get_line("Transfer-Encoding");
    let content_length = headers.get("Content-Length");

    if !transfer_encoding.is_empty() {
        ensure!(
            content_length.is_empty(),
            DecodeError::invalid_header("transfer_encoding and content_length both present in headers")
        );
        ensure!(
            !is_chunked(&transfer_encoding),
            DecodeError::invalid_header("chunked transfer encoding is not supported")
        );
        return Ok(0);
    }

    let Some(first) = content_length.first() else {
        return Ok(0);
    };
    ensure!(
        content_length.iter().all(|value| value == first),
        DecodeError::invalid_header("conflicting content-length values")
    );
    first.trim().parse::<usize>().map_err(|_| DecodeError::invalid_header(format!("content-length {first} is not a number")))
}

/// Chunked must be the final encoding to count.
fn is_chunked(transfer_encoding: &str) -> bool {
    transfer_encoding.rsplit(',').next().is_some_and(|last| last.trim().eq_ignore_ascii_case("chunked"))
}

/// Deserializes JSON objects/arrays and url-encoded forms; anything else is left alone.
fn parse_body(content_type: &str, body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    let mime = content_type.parse::<mime::Mime>().ok()?;

    if mime.essence_str() == mime::APPLICATION_JSON.essence_str() {
        return match serde_json::from_slice::<Value>(body) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
            Ok(_) => None,
            Err(e) => {
                warn!(cause = %e, "failed to parse json request body");
                None
            }
        };
    }

    if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        return match serde_urlencoded::from_bytes::<Vec<(String, String)>>(body) {
            Ok(pairs) => Some(Value::Object(pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect())),
            Err(e) => {
                warn!(cause = %e, "failed to parse form request body");
                None
            }
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HttpMessage;
    use http::Method;
    use indoc::indoc;
    use serde_json::json;

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html?a=1&b=x+y HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*
        Cookie: session=abc; theme=dark

        "##};

        let mut buf = BytesMut::from(str);
        let mut request = RequestHeadDecoder::default().decode(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.protocol_version(), ProtocolVersion::Http11);
        assert_eq!(request.uri().to_string(), "http://127.0.0.1:8080/index.html?a=1&b=x+y");
        assert_eq!(request.request_target(), "/index.html?a=1&b=x+y");
        assert_eq!(request.headers().len(), 4);
        assert_eq!(request.header("user-agent"), ["curl/7.79.1"]);

        assert_eq!(request.query_params().get("b").map(String::as_str), Some("x y"));
        assert_eq!(request.cookie_params().get("theme").map(String::as_str), Some("dark"));
        assert_eq!(request.server_params().get("REQUEST_METHOD").map(String::as_str), Some("GET"));
        assert_eq!(request.server_params().get("SERVER_PROTOCOL").map(String::as_str), Some("HTTP/1.1"));
        assert!(request.is_empty());
    }

    #[test]
    fn waits_for_whole_body() {
        let mut buf = BytesMut::from("POST /items HTTP/1.1\r\nHost: a.test\r\nContent-Type: application/json\r\nContent-Length: 8\r\n\r\n{\"id\"");
        let mut decoder = RequestHeadDecoder::default();
        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b":7}GET");
        let mut request = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&buf[..], b"GET");

        assert!(request.request().is_post());
        assert_eq!(request.body().to_text(), r#"{"id":7}"#);
        assert_eq!(request.parsed_body(), Some(&json!({"id": 7})));
    }

    #[test]
    fn form_body_is_parsed() {
        let mut buf = BytesMut::from(
            "POST /login HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 17\r\n\r\nuser=bob&pw=a%26b",
        );
        let request = RequestHeadDecoder::default().decode(&mut buf).unwrap().unwrap();
        assert_eq!(request.protocol_version(), ProtocolVersion::Http10);
        assert_eq!(request.parsed_body(), Some(&json!({"user": "bob", "pw": "a&b"})));
        assert!(buf.is_empty());
    }

    #[test]
    fn asterisk_target() {
        let mut buf = BytesMut::from("OPTIONS * HTTP/1.1\r\nHost: a.test\r\n\r\n");
        let request = RequestHeadDecoder::default().decode(&mut buf).unwrap().unwrap();
        assert_eq!(request.request_target(), "*");
        assert_eq!(request.method(), Method::OPTIONS);
    }

    #[test]
    fn rejects_chunked() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: gzip, chunked\r\n\r\n");
        let err = RequestHeadDecoder::default().decode(&mut buf).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHeader { .. }));

        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\nContent-Length: 3\r\n\r\nabc");
        assert!(RequestHeadDecoder::default().decode(&mut buf).is_err());
    }

    #[test]
    fn check_is_chunked() {
        assert!(is_chunked("chunked"));
        assert!(is_chunked("gzip, Chunked"));
        assert!(!is_chunked("chunked, gzip"));
        assert!(!is_chunked("gzip"));
    }

    #[test]
    fn enforces_limits() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n");
        let err = RequestHeadDecoder::new(1024, 2).decode(&mut buf).unwrap_err();
        assert!(matches!(err, DecodeError::TooManyHeaders { max_num: 2 }));

        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let err = RequestHeadDecoder::new(32, 8).decode(&mut buf).unwrap_err();
        assert!(matches!(err, DecodeError::TooLargeHeader { max_size: 32, .. }));
    }

    #[test]
    fn partial_head_needs_more() {
        let mut buf = BytesMut::from("GET /index.html HTTP/1.1\r\nHost: a");
        assert!(RequestHeadDecoder::default().decode(&mut buf).unwrap().is_none());
    }
}
