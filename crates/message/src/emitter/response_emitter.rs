use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{debug, trace};

use crate::codec::ResponseHeadEncoder;
use crate::emitter::{ContentRange, EmitterConfig};
use crate::error::{EmitError, MessageError};
use crate::protocol::{HttpMessage, Response};
use crate::stream::{ByteStream, Whence};

const INIT_BUFFER_SIZE: usize = 4 * 1024;

/// Writes responses to an async sink: status line, headers, blank line, body.
///
/// The emitter does not add framing headers; a response meant for a
/// persistent connection should carry its own `Content-Length`.
#[derive(Debug)]
pub struct Emitter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseHeadEncoder,
    config: EmitterConfig,
    emitted: bool,
}

impl<W> Emitter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, EmitterConfig::default())
    }

    pub fn with_config(writer: W, config: EmitterConfig) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(INIT_BUFFER_SIZE), encoder: ResponseHeadEncoder, config, emitted: false }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Whether any response has been written through this emitter.
    pub fn has_emitted(&self) -> bool {
        self.emitted
    }

    /// Writes `response` and flushes the sink.
    ///
    /// In strict mode a second call fails with [`EmitError::AlreadyEmitted`]
    /// before anything is written.
    pub async fn emit(&mut self, response: &mut Response) -> Result<(), EmitError> {
        if self.config.strict && self.emitted {
            return Err(EmitError::AlreadyEmitted);
        }
        self.emitted = true;

        self.buffer.clear();
        self.encoder.encode(&*response, &mut self.buffer)?;
        self.writer.write_all(&self.buffer).await?;
        debug!(status = response.status(), version = %response.protocol_version(), "emitted response head");

        let written = match self.config.buffer_length.filter(|length| *length > 0) {
            None => self.emit_whole_body(response.body()).await?,
            Some(buffer_length) => {
                let range = ContentRange::parse(&response.header_line("Content-Range")).filter(ContentRange::is_bytes);
                match range {
                    Some(range) => self.emit_body_range(response.body(), &range, buffer_length).await?,
                    None => self.emit_body_chunked(response.body(), buffer_length).await?,
                }
            }
        };

        self.writer.flush().await?;
        trace!(body_size = written, "emitted response body");
        Ok(())
    }

    async fn emit_whole_body(&mut self, body: &mut ByteStream) -> Result<u64, EmitError> {
        if body.is_seekable() {
            body.rewind()?;
        }
        let content = body.contents()?;
        self.writer.write_all(&content).await?;
        Ok(content.len() as u64)
    }

    async fn emit_body_chunked(&mut self, body: &mut ByteStream, buffer_length: usize) -> Result<u64, EmitError> {
        if body.is_seekable() {
            body.rewind()?;
        }

        let mut written = 0u64;
        while !body.eof() {
            let chunk = body.read(buffer_length)?;
            if chunk.is_empty() {
                break;
            }
            self.writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }

    async fn emit_body_range(
        &mut self,
        body: &mut ByteStream,
        range: &ContentRange,
        buffer_length: usize,
    ) -> Result<u64, EmitError> {
        if body.is_seekable() {
            let first = i64::try_from(range.first)
                .map_err(|_| MessageError::invalid_argument(format!("range start {} out of bounds", range.first)))?;
            body.seek(first, Whence::Start)?;
        }

        let mut remaining = range.len();
        let mut written = 0u64;
        while remaining > 0 && !body.eof() {
            let want = usize::try_from(remaining).map_or(buffer_length, |remaining| remaining.min(buffer_length));
            let chunk = body.read(want)?;
            if chunk.is_empty() {
                break;
            }
            self.writer.write_all(&chunk).await?;
            remaining = remaining.saturating_sub(chunk.len() as u64);
            written += chunk.len() as u64;
        }
        Ok(written)
    }
}
