//! Error types shared by every component of the message model.
//!
//! The core types (stream, headers, uri, messages) only ever fail with a
//! [`MessageError`]. The outer layers wrap it: the codec in [`DecodeError`],
//! the emitter in [`EmitError`] and the client side in [`TransportError`].

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    /// Malformed header, status code, uri component or stream mode.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Operation on a detached, closed or non-capable stream.
    #[error("illegal state: {reason}")]
    IllegalState { reason: String },

    #[error("io error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl MessageError {
    pub fn invalid_argument<S: ToString>(str: S) -> Self {
        Self::InvalidArgument { reason: str.to_string() }
    }

    pub fn illegal_state<S: ToString>(str: S) -> Self {
        Self::IllegalState { reason: str.to_string() }
    }

    pub fn io<S: ToString, E: Into<io::Error>>(context: S, e: E) -> Self {
        Self::Io { context: context.to_string(), source: e.into() }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MessageError::InvalidArgument { .. })
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, MessageError::IllegalState { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, MessageError::Io { .. })
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid status line: {line}")]
    InvalidStatusLine { line: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl DecodeError {
    pub fn invalid_status_line<S: ToString>(str: S) -> Self {
        Self::InvalidStatusLine { line: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("unable to emit response; output has been emitted previously")]
    AlreadyEmitted,

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("unsupported: {reason}")]
    Unsupported { reason: String },

    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl TransportError {
    pub fn invalid_request<S: ToString>(str: S) -> Self {
        Self::InvalidRequest { reason: str.to_string() }
    }

    pub fn invalid_response<S: ToString>(str: S) -> Self {
        Self::InvalidResponse { reason: str.to_string() }
    }

    pub fn unsupported<S: ToString>(str: S) -> Self {
        Self::Unsupported { reason: str.to_string() }
    }
}
