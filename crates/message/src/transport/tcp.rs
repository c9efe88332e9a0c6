use async_trait::async_trait;
use bytes::BytesMut;
use http::header::{CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING, USER_AGENT};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::codec::{RequestEncoder, ResponseHeadDecoder};
use crate::error::TransportError;
use crate::protocol::{HttpMessage, Request, Response};
use crate::stream::ByteStream;
use crate::transport::{Transport, TransportConfig};
use crate::uri::default_port;

const INIT_BUFFER_SIZE: usize = 8 * 1024;

/// Sends `http://` requests over a fresh TCP connection each time.
#[derive(Debug, Clone, Default)]
pub struct TcpTransport {
    config: TransportConfig,
}

impl TcpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn prepare(&self, request: &mut Request) -> Result<(String, u16), TransportError> {
        let uri = request.uri();
        match uri.scheme() {
            "http" => {}
            "" => return Err(TransportError::invalid_request(format!("uri {uri} has no scheme"))),
            other => return Err(TransportError::unsupported(format!("scheme {other:?}"))),
        }
        if uri.host().is_empty() {
            return Err(TransportError::invalid_request(format!("uri {uri} has no host")));
        }

        let host = uri.host().trim_start_matches('[').trim_end_matches(']').to_owned();
        let port = uri.port().or_else(|| default_port(uri.scheme())).unwrap_or(80);

        let headers = request.headers_mut();
        if !headers.has(CONNECTION.as_str()) {
            headers.insert("Connection", "close")?;
        }
        if !headers.has(USER_AGENT.as_str()) {
            headers.insert("User-Agent", &self.config.user_agent)?;
        }
        Ok((host, port))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, mut request: Request) -> Result<Response, TransportError> {
        let (host, port) = self.prepare(&mut request)?;
        let method = request.method().clone();
        let target = request.request_target();

        let mut buf = BytesMut::with_capacity(INIT_BUFFER_SIZE);
        RequestEncoder.encode(request, &mut buf)?;

        let mut stream = TcpStream::connect((host.as_str(), port)).await?;
        stream.write_all(&buf).await?;
        stream.flush().await?;
        trace!(%host, port, request_size = buf.len(), "request written");

        buf.clear();
        let mut decoder = ResponseHeadDecoder::new(self.config.max_header_bytes, self.config.max_headers);
        let response = loop {
            if let Some(response) = decoder.decode(&mut buf)? {
                break response;
            }
            if stream.read_buf(&mut buf).await? == 0 {
                return Err(TransportError::invalid_response("connection closed before the response head"));
            }
        };

        let body_expected = method != http::Method::HEAD && !matches!(response.status(), 204 | 304);
        let response = if body_expected { read_body(&mut stream, response, buf).await? } else { response };

        debug!(%method, %target, status = response.status(), "received response");
        Ok(response)
    }
}

async fn read_body<R>(reader: &mut R, response: Response, mut buf: BytesMut) -> Result<Response, TransportError>
where
    R: AsyncRead + Unpin,
{
    if response.has_header(TRANSFER_ENCODING.as_str()) {
        return Err(TransportError::unsupported(format!(
            "transfer-encoding {:?}",
            response.header_line(TRANSFER_ENCODING.as_str())
        )));
    }

    match content_length(&response)? {
        Some(length) => {
            while buf.len() < length {
                if reader.read_buf(&mut buf).await? == 0 {
                    return Err(TransportError::invalid_response(format!(
                        "body ended after {} of {length} bytes",
                        buf.len()
                    )));
                }
            }
            buf.truncate(length);
        }
        None => while reader.read_buf(&mut buf).await? != 0 {},
    }

    trace!(body_size = buf.len(), "response body read");
    Ok(response.with_body(ByteStream::from(buf.freeze())))
}

fn content_length(response: &Response) -> Result<Option<usize>, TransportError> {
    let values = response.header(CONTENT_LENGTH.as_str());
    let Some(first) = values.first() else {
        return Ok(None);
    };
    if values.iter().any(|value| value != first) {
        return Err(TransportError::invalid_response("conflicting content-length values"));
    }
    first
        .parse::<usize>()
        .map(Some)
        .map_err(|_| TransportError::invalid_response(format!("invalid content-length {first:?}")))
}
