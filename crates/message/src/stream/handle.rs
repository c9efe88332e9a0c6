//! External handles a [`ByteStream`](super::ByteStream) can be backed by.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::MessageError;
use crate::stream::OpenMode;

/// What a handle is able to do. Fixed when the stream is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub readable: bool,
    pub writable: bool,
    pub seekable: bool,
}

impl Capabilities {
    pub const ALL: Capabilities = Capabilities { readable: true, writable: true, seekable: true };
    pub const NONE: Capabilities = Capabilities { readable: false, writable: false, seekable: false };
}

fn unsupported(operation: &str) -> io::Error {
    io::Error::new(ErrorKind::Unsupported, format!("handle does not support {operation}"))
}

/// An external byte sink/source.
///
/// Implementors only override the operations their [`Capabilities`] claim;
/// the defaults fail with [`ErrorKind::Unsupported`].
pub trait StreamHandle: fmt::Debug + Send {
    fn capabilities(&self) -> Capabilities;

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(unsupported("read"))
    }

    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(unsupported("write"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(unsupported("seek"))
    }

    /// Total length of the underlying resource, when it can be determined.
    fn size(&mut self) -> io::Result<Option<u64>> {
        Ok(None)
    }

    /// A diagnostic locator, e.g. a file path.
    fn locator(&self) -> Option<&str> {
        None
    }
}

/// A growable in-process buffer exposed as a handle.
///
/// This is what a memory-backed stream hands out on `detach`, and what the
/// `Temp` target builds on.
#[derive(Debug, Default)]
pub struct MemoryHandle {
    cursor: Cursor<Vec<u8>>,
}

impl MemoryHandle {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { cursor: Cursor::new(bytes) }
    }

    /// Builds the handle with the cursor already placed at the end.
    pub fn at_end(bytes: Vec<u8>) -> Self {
        let position = bytes.len() as u64;
        let mut cursor = Cursor::new(bytes);
        cursor.set_position(position);
        Self { cursor }
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn get_ref(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl StreamHandle for MemoryHandle {
    fn capabilities(&self) -> Capabilities {
        Capabilities::ALL
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.cursor.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }

    fn size(&mut self) -> io::Result<Option<u64>> {
        Ok(Some(self.cursor.get_ref().len() as u64))
    }

    fn locator(&self) -> Option<&str> {
        Some("memory")
    }
}

/// A file on disk opened with an fopen-style [`OpenMode`].
#[derive(Debug)]
pub struct FileHandle {
    file: File,
    mode: OpenMode,
    locator: String,
}

impl FileHandle {
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self, MessageError> {
        let path = path.as_ref();
        let file = mode
            .open_options()
            .open(path)
            .map_err(|e| MessageError::io(format!("unable to open {}", path.display()), e))?;
        Ok(Self::from_file(file, mode, path.to_path_buf()))
    }

    pub fn from_file(file: File, mode: OpenMode, path: PathBuf) -> Self {
        Self { file, mode, locator: path.display().to_string() }
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn into_file(self) -> File {
        self.file
    }
}

impl StreamHandle for FileHandle {
    fn capabilities(&self) -> Capabilities {
        Capabilities { readable: self.mode.is_readable(), writable: self.mode.is_writable(), seekable: true }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn size(&mut self) -> io::Result<Option<u64>> {
        self.file.metadata().map(|meta| Some(meta.len()))
    }

    fn locator(&self) -> Option<&str> {
        Some(&self.locator)
    }
}

/// A read-only, forward-only source such as a socket or a pipe.
pub struct ReaderHandle<R> {
    reader: R,
}

impl<R: Read + Send> ReaderHandle<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> fmt::Debug for ReaderHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderHandle").finish_non_exhaustive()
    }
}

impl<R: Read + Send> StreamHandle for ReaderHandle<R> {
    fn capabilities(&self) -> Capabilities {
        Capabilities { readable: true, ..Capabilities::NONE }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

/// A write-only sink.
pub struct WriterHandle<W> {
    writer: W,
}

impl<W: Write + Send> WriterHandle<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> fmt::Debug for WriterHandle<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterHandle").finish_non_exhaustive()
    }
}

impl<W: Write + Send> StreamHandle for WriterHandle<W> {
    fn capabilities(&self) -> Capabilities {
        Capabilities { writable: true, ..Capabilities::NONE }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
