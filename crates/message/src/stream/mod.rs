//! Byte stream abstraction used as the body of every message.
//!
//! A [`ByteStream`] is either backed by an in-process buffer or by an external
//! [`StreamHandle`] (a file, a temporary buffer, a reader or a writer). Callers
//! see the same read/write/seek surface in both cases.
//!
//! - [`ByteStream`]: the dual-mode stream itself
//! - [`StreamHandle`]: the external handle seam, with stock implementations
//!   [`MemoryHandle`], [`FileHandle`], [`ReaderHandle`] and [`WriterHandle`]
//! - [`OpenMode`]: fopen-style access mode parsing

mod byte_stream;
pub use byte_stream::ByteStream;
pub use byte_stream::StreamMetadata;
pub use byte_stream::Target;
pub use byte_stream::Whence;

mod handle;
pub use handle::Capabilities;
pub use handle::FileHandle;
pub use handle::MemoryHandle;
pub use handle::ReaderHandle;
pub use handle::StreamHandle;
pub use handle::WriterHandle;

mod mode;
pub use mode::OpenMode;
