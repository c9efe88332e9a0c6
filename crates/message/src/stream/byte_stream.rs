//! The dual-mode byte stream.
//!
//! In memory mode there is no real file cursor, so every positional read and
//! write is simulated against one contiguous [`BytesMut`]. The cursor always
//! stays within `[0, size]`.
//!
//! In handle mode the stream delegates to a [`StreamHandle`] and only keeps
//! the bookkeeping the handle cannot give back cheaply: the cached size, the
//! end-of-file flag and a byte counter for handles that cannot report their
//! own position.
//!
//! A `ByteStream` is an owned mutable resource. It is `Send`, and every
//! operation takes `&mut self`; sharing one stream between threads needs
//! external synchronization, and concurrent readers should copy the bytes
//! out first.

use std::io::{self, ErrorKind, SeekFrom};
use std::path::Path;

use bytes::{Bytes, BytesMut};
use tracing::{trace, warn};

use crate::ensure;
use crate::error::MessageError;
use crate::stream::{Capabilities, FileHandle, MemoryHandle, OpenMode, StreamHandle};

const READ_CHUNK: usize = 8 * 1024;

/// Reference point of a [`ByteStream::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Whence {
    #[default]
    Start,
    Current,
    End,
}

/// Where the initial content of a stream is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Memory mode: the bytes live directly inside the stream.
    #[default]
    Memory,
    /// Handle mode over a temporary in-process [`MemoryHandle`].
    Temp,
}

/// Snapshot of a stream's state, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetadata {
    pub locator: Option<String>,
    pub readable: bool,
    pub writable: bool,
    pub seekable: bool,
    pub eof: bool,
}

#[derive(Debug)]
enum Backing {
    Memory { buffer: BytesMut, cursor: usize },
    Handle(HandleState),
}

#[derive(Debug)]
struct HandleState {
    handle: Box<dyn StreamHandle>,
    eof: bool,
    /// bytes moved since the last seek, for handles that cannot `tell`
    position: u64,
}

/// A readable, writable, seekable byte sequence backed either by memory or by
/// an external handle.
#[derive(Debug)]
pub struct ByteStream {
    /// `None` once the stream has been detached or closed.
    backing: Option<Backing>,
    size: Option<u64>,
    capabilities: Capabilities,
    locator: Option<String>,
}

impl Default for ByteStream {
    fn default() -> Self {
        Self::empty()
    }
}

impl ByteStream {
    /// An empty memory-backed stream.
    pub fn empty() -> Self {
        Self::new(&b""[..])
    }

    /// A memory-backed stream holding `content`, cursor placed at the end.
    pub fn new<B: AsRef<[u8]>>(content: B) -> Self {
        let buffer = BytesMut::from(content.as_ref());
        let cursor = buffer.len();
        Self {
            size: Some(buffer.len() as u64),
            backing: Some(Backing::Memory { buffer, cursor }),
            capabilities: Capabilities::ALL,
            locator: None,
        }
    }

    /// Builds a stream holding `content` in the given [`Target`].
    pub fn with_target<B: AsRef<[u8]>>(content: B, target: Target) -> Self {
        match target {
            Target::Memory => Self::new(content),
            Target::Temp => Self::from_handle(MemoryHandle::at_end(content.as_ref().to_vec())),
        }
    }

    /// Opens a file with an fopen-style mode such as `"r"` or `"w+"`.
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self, MessageError> {
        let mode = OpenMode::parse(mode)?;
        Ok(Self::from_handle(FileHandle::open(path, mode)?))
    }

    pub fn from_handle<H: StreamHandle + 'static>(handle: H) -> Self {
        Self::from_boxed_handle(Box::new(handle))
    }

    /// Wraps an external handle. Capabilities are read once, here; a handle
    /// claiming to be seekable is checked with a no-op seek first.
    pub fn from_boxed_handle(mut handle: Box<dyn StreamHandle>) -> Self {
        let mut capabilities = handle.capabilities();
        if capabilities.seekable {
            capabilities.seekable = handle.seek(SeekFrom::Current(0)).is_ok();
        }
        let locator = handle.locator().map(ToString::to_string);

        Self {
            backing: Some(Backing::Handle(HandleState { handle, eof: false, position: 0 })),
            size: None,
            capabilities,
            locator,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.backing.is_some()
    }

    #[inline]
    pub fn is_memory(&self) -> bool {
        matches!(self.backing, Some(Backing::Memory { .. }))
    }

    #[inline]
    pub fn is_readable(&self) -> bool {
        self.capabilities.readable
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.capabilities.writable
    }

    #[inline]
    pub fn is_seekable(&self) -> bool {
        self.capabilities.seekable
    }

    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    /// Writes `data` at the cursor and returns the number of bytes written.
    ///
    /// In memory mode the write is spliced in at the cursor: at position 0 the
    /// data is prepended, at or past the end it is appended, anywhere else the
    /// buffer becomes prefix + data + suffix. The cursor then advances past the
    /// written bytes.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, MessageError> {
        let writable = self.capabilities.writable;
        let backing = self.backing.as_mut().ok_or_else(detached)?;
        ensure!(writable, MessageError::illegal_state("cannot write to a non-writable stream"));

        match backing {
            Backing::Memory { buffer, cursor } => {
                splice(buffer, *cursor, data);
                *cursor += data.len();
                self.size = Some(buffer.len() as u64);
                Ok(data.len())
            }
            Backing::Handle(state) => {
                self.size = None;
                let mut written = 0;
                while written < data.len() {
                    match state.handle.write(&data[written..]) {
                        Ok(0) => {
                            return Err(MessageError::io(
                                "unable to write to stream",
                                io::Error::from(ErrorKind::WriteZero),
                            ));
                        }
                        Ok(n) => written += n,
                        Err(e) if e.kind() == ErrorKind::Interrupted => {}
                        Err(e) => return Err(MessageError::io("unable to write to stream", e)),
                    }
                }
                state.position += written as u64;
                Ok(written)
            }
        }
    }

    /// Reads up to `len` bytes from the cursor.
    ///
    /// A short (or empty) result means the end was reached; check [`eof`](Self::eof).
    pub fn read(&mut self, len: usize) -> Result<Bytes, MessageError> {
        let readable = self.capabilities.readable;
        let backing = self.backing.as_mut().ok_or_else(detached)?;
        ensure!(readable, MessageError::illegal_state("cannot read from a non-readable stream"));

        match backing {
            Backing::Memory { buffer, cursor } => {
                let start = (*cursor).min(buffer.len());
                let end = cursor.saturating_add(len).min(buffer.len());
                *cursor = end;
                Ok(Bytes::copy_from_slice(&buffer[start..end]))
            }
            Backing::Handle(state) => {
                let mut out = vec![0u8; len];
                let mut filled = 0;
                while filled < len {
                    match state.handle.read(&mut out[filled..]) {
                        Ok(0) => {
                            state.eof = true;
                            break;
                        }
                        Ok(n) => filled += n,
                        Err(e) if e.kind() == ErrorKind::Interrupted => {}
                        Err(e) => return Err(MessageError::io("unable to read from stream", e)),
                    }
                }
                out.truncate(filled);
                state.position += filled as u64;
                Ok(Bytes::from(out))
            }
        }
    }

    /// Moves the cursor. In memory mode the result is clamped to `[0, size]`.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<(), MessageError> {
        let seekable = self.capabilities.seekable;
        let backing = self.backing.as_mut().ok_or_else(detached)?;
        ensure!(seekable, MessageError::illegal_state("stream is not seekable"));

        match backing {
            Backing::Memory { buffer, cursor } => {
                let size = buffer.len() as i64;
                let base = match whence {
                    Whence::Start => 0,
                    Whence::Current => *cursor as i64,
                    Whence::End => size,
                };
                *cursor = base.saturating_add(offset).clamp(0, size) as usize;
                Ok(())
            }
            Backing::Handle(state) => {
                let pos = match whence {
                    Whence::Start => {
                        let start = u64::try_from(offset).map_err(|_| {
                            MessageError::io(
                                format!("unable to seek to stream position {offset}"),
                                io::Error::from(ErrorKind::InvalidInput),
                            )
                        })?;
                        SeekFrom::Start(start)
                    }
                    Whence::Current => SeekFrom::Current(offset),
                    Whence::End => SeekFrom::End(offset),
                };
                let position = state
                    .handle
                    .seek(pos)
                    .map_err(|e| MessageError::io(format!("unable to seek to stream position {offset} with whence {whence:?}"), e))?;
                state.position = position;
                state.eof = false;
                Ok(())
            }
        }
    }

    #[inline]
    pub fn rewind(&mut self) -> Result<(), MessageError> {
        self.seek(0, Whence::Start)
    }

    /// Current cursor position.
    pub fn tell(&mut self) -> Result<u64, MessageError> {
        let seekable = self.capabilities.seekable;
        match self.backing.as_mut().ok_or_else(detached)? {
            Backing::Memory { cursor, .. } => Ok(*cursor as u64),
            Backing::Handle(state) if seekable => state
                .handle
                .seek(SeekFrom::Current(0))
                .map_err(|e| MessageError::io("unable to determine stream position", e)),
            Backing::Handle(state) => Ok(state.position),
        }
    }

    /// Whether the cursor has reached the end. A detached stream reports `false`.
    pub fn eof(&self) -> bool {
        match &self.backing {
            None => false,
            Some(Backing::Memory { buffer, cursor }) => *cursor >= buffer.len(),
            Some(Backing::Handle(state)) => state.eof,
        }
    }

    /// Total size in bytes, if known.
    ///
    /// The value is cached after the first computation and cleared by every
    /// handle-mode write.
    pub fn size(&mut self) -> Option<u64> {
        if self.size.is_some() {
            return self.size;
        }

        let size = match self.backing.as_mut()? {
            Backing::Memory { buffer, .. } => Some(buffer.len() as u64),
            Backing::Handle(state) => match state.handle.size() {
                Ok(size) => size,
                Err(e) => {
                    warn!(cause = %e, locator = ?self.locator, "unable to stat stream handle");
                    None
                }
            },
        };
        self.size = size;
        size
    }

    /// Returns the stream contents.
    ///
    /// Memory mode returns the whole buffer regardless of the cursor; handle
    /// mode reads from the current position until exhaustion.
    pub fn contents(&mut self) -> Result<Bytes, MessageError> {
        let readable = self.capabilities.readable;
        match self.backing.as_mut().ok_or_else(detached)? {
            Backing::Memory { buffer, .. } => Ok(Bytes::copy_from_slice(buffer)),
            Backing::Handle(state) => {
                ensure!(readable, MessageError::illegal_state("cannot read from a non-readable stream"));
                let mut out = BytesMut::new();
                let mut chunk = [0u8; READ_CHUNK];
                loop {
                    match state.handle.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => out.extend_from_slice(&chunk[..n]),
                        Err(e) if e.kind() == ErrorKind::Interrupted => {}
                        Err(e) => return Err(MessageError::io("unable to read stream content", e)),
                    }
                }
                state.eof = true;
                state.position += out.len() as u64;
                Ok(out.freeze())
            }
        }
    }

    /// Best-effort rendering of the whole stream as text.
    ///
    /// Rewinds when possible and reads everything. Stream errors are logged
    /// and turned into an empty string; this never fails.
    pub fn to_text(&mut self) -> String {
        if !self.is_open() {
            return String::new();
        }

        if self.is_seekable() {
            if let Err(e) = self.rewind() {
                warn!(cause = %e, "unable to rewind stream while rendering");
                return String::new();
            }
        }

        match self.contents() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(cause = %e, "unable to read stream while rendering");
                String::new()
            }
        }
    }

    pub fn metadata(&self) -> StreamMetadata {
        StreamMetadata {
            locator: self.locator.clone(),
            readable: self.capabilities.readable,
            writable: self.capabilities.writable,
            seekable: self.capabilities.seekable,
            eof: self.eof(),
        }
    }

    /// Hands the underlying resource to the caller and leaves this stream inert.
    ///
    /// A memory-backed stream is materialized into a fresh [`MemoryHandle`]
    /// positioned at the start. Returns `None` if the stream was already
    /// detached or closed.
    pub fn detach(&mut self) -> Option<Box<dyn StreamHandle>> {
        let backing = self.backing.take()?;
        self.make_inert();
        trace!(locator = ?self.locator, "stream detached");
        self.locator = None;

        match backing {
            Backing::Memory { buffer, .. } => Some(Box::new(MemoryHandle::new(buffer.to_vec()))),
            Backing::Handle(state) => Some(state.handle),
        }
    }

    /// Releases the underlying resource. Closing twice is a no-op.
    pub fn close(&mut self) {
        let Some(backing) = self.backing.take() else {
            return;
        };
        self.make_inert();

        if let Backing::Handle(mut state) = backing {
            if let Err(e) = state.handle.flush() {
                warn!(cause = %e, locator = ?self.locator, "flush failed while closing stream");
            }
        }
        trace!(locator = ?self.locator, "stream closed");
        self.locator = None;
    }

    fn make_inert(&mut self) {
        self.size = None;
        self.capabilities = Capabilities::NONE;
    }
}

impl Drop for ByteStream {
    fn drop(&mut self) {
        self.close();
    }
}

fn detached() -> MessageError {
    MessageError::illegal_state("stream is detached")
}

/// Inserts `data` into `buffer` at `cursor`.
fn splice(buffer: &mut BytesMut, cursor: usize, data: &[u8]) {
    if cursor == 0 {
        let mut next = BytesMut::with_capacity(data.len() + buffer.len());
        next.extend_from_slice(data);
        next.extend_from_slice(buffer);
        *buffer = next;
    } else if cursor >= buffer.len() {
        buffer.extend_from_slice(data);
    } else {
        let suffix = buffer.split_off(cursor);
        buffer.extend_from_slice(data);
        buffer.extend_from_slice(&suffix);
    }
}

impl From<&str> for ByteStream {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ByteStream {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<Bytes> for ByteStream {
    fn from(value: Bytes) -> Self {
        Self::new(value)
    }
}
