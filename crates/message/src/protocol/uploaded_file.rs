use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::ensure;
use crate::error::MessageError;
use crate::stream::ByteStream;

const COPY_CHUNK: usize = 1024 * 1024;

/// Status of an upload, numbered like the common `UPLOAD_ERR_*` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UploadStatus {
    #[default]
    Ok,
    IniSize,
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
}

impl UploadStatus {
    pub fn code(&self) -> u8 {
        match self {
            UploadStatus::Ok => 0,
            UploadStatus::IniSize => 1,
            UploadStatus::FormSize => 2,
            UploadStatus::Partial => 3,
            UploadStatus::NoFile => 4,
            UploadStatus::NoTmpDir => 6,
            UploadStatus::CantWrite => 7,
            UploadStatus::Extension => 8,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, UploadStatus::Ok)
    }
}

impl TryFrom<u8> for UploadStatus {
    type Error = MessageError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => UploadStatus::Ok,
            1 => UploadStatus::IniSize,
            2 => UploadStatus::FormSize,
            3 => UploadStatus::Partial,
            4 => UploadStatus::NoFile,
            6 => UploadStatus::NoTmpDir,
            7 => UploadStatus::CantWrite,
            8 => UploadStatus::Extension,
            other => return Err(MessageError::invalid_argument(format!("invalid upload status {other}"))),
        })
    }
}

#[derive(Debug)]
enum Source {
    /// a file on disk; the stream is opened on first access
    Path { path: PathBuf, opened: Option<ByteStream> },
    Stream(ByteStream),
}

/// A file received as part of a request.
///
/// The content is either a temporary file on disk or a [`ByteStream`]. It can
/// be read through [`stream`](Self::stream) until it is moved with
/// [`move_to`](Self::move_to), which succeeds at most once.
#[derive(Debug)]
pub struct UploadedFile {
    /// `None` when the upload failed
    source: Option<Source>,
    size: Option<u64>,
    status: UploadStatus,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    moved: bool,
}

impl UploadedFile {
    /// An upload whose content sits in the file at `path`.
    pub fn from_path<P: Into<PathBuf>>(path: P, size: Option<u64>) -> Result<Self, MessageError> {
        let path = path.into();
        ensure!(
            !path.as_os_str().is_empty(),
            MessageError::invalid_argument("invalid stream or file provided for uploaded file")
        );
        Ok(Self::with_source(Some(Source::Path { path, opened: None }), size, UploadStatus::Ok))
    }

    /// An upload whose content is held by `stream`.
    pub fn from_stream(stream: ByteStream, size: Option<u64>) -> Self {
        Self::with_source(Some(Source::Stream(stream)), size, UploadStatus::Ok)
    }

    /// A failed upload. It has no content.
    pub fn failed(status: UploadStatus) -> Self {
        Self::with_source(None, None, status)
    }

    fn with_source(source: Option<Source>, size: Option<u64>, status: UploadStatus) -> Self {
        Self { source, size, status, client_filename: None, client_media_type: None, moved: false }
    }

    pub fn with_client_filename(mut self, filename: &str) -> Self {
        self.client_filename = Some(filename.to_owned());
        self
    }

    pub fn with_client_media_type(mut self, media_type: &str) -> Self {
        self.client_media_type = Some(media_type.to_owned());
        self
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    pub fn is_moved(&self) -> bool {
        self.moved
    }

    fn check_available(&self) -> Result<(), MessageError> {
        ensure!(self.status.is_ok(), MessageError::illegal_state("cannot retrieve stream due to upload error"));
        ensure!(!self.moved, MessageError::illegal_state("cannot retrieve stream after it has already been moved"));
        Ok(())
    }

    /// The content of the upload.
    ///
    /// Fails with [`MessageError::IllegalState`] when the upload failed or was
    /// already moved.
    pub fn stream(&mut self) -> Result<&mut ByteStream, MessageError> {
        self.check_available()?;

        match &mut self.source {
            Some(Source::Stream(stream)) => Ok(stream),
            Some(Source::Path { path, opened }) => {
                let stream = match opened.take() {
                    Some(stream) => stream,
                    None => ByteStream::open(path.as_path(), "r")?,
                };
                Ok(opened.insert(stream))
            }
            None => Err(MessageError::illegal_state("uploaded file has no content")),
        }
    }

    /// Moves the upload to `target`.
    ///
    /// A file-backed upload is renamed; a stream-backed upload is copied from
    /// its start in 1 MiB chunks. Only the first move can succeed.
    pub fn move_to<P: AsRef<Path>>(&mut self, target: P) -> Result<(), MessageError> {
        self.check_available()?;
        let target = target.as_ref();
        ensure!(
            !target.as_os_str().is_empty(),
            MessageError::invalid_argument("invalid path provided for move operation; must be a non-empty path")
        );

        match &mut self.source {
            Some(Source::Path { path, opened }) => {
                if let Some(mut stream) = opened.take() {
                    stream.close();
                }
                fs::rename(path.as_path(), target).map_err(|e| {
                    MessageError::io(format!("uploaded file could not be moved to {}", target.display()), e)
                })?;
            }
            Some(Source::Stream(stream)) => copy_to(stream, target)?,
            None => return Err(MessageError::illegal_state("uploaded file has no content")),
        }

        debug!(target = %target.display(), "uploaded file moved");
        self.moved = true;
        Ok(())
    }
}

fn copy_to(source: &mut ByteStream, target: &Path) -> Result<(), MessageError> {
    if source.is_seekable() {
        source.rewind()?;
    }

    let mut dest = ByteStream::open(target, "w")?;
    let mut copied = 0usize;
    while !source.eof() {
        let chunk = source.read(COPY_CHUNK)?;
        if chunk.is_empty() {
            break;
        }
        copied += dest.write(&chunk)?;
    }
    dest.close();

    trace!(copied, target = %target.display(), "copied uploaded stream");
    Ok(())
}
