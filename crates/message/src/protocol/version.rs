use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::MessageError;

/// The HTTP protocol versions a message may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolVersion {
    Http10,
    #[default]
    Http11,
    Http20,
}

impl ProtocolVersion {
    /// The version as written after `HTTP/`, e.g. `1.1`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::Http10 => "1.0",
            ProtocolVersion::Http11 => "1.1",
            ProtocolVersion::Http20 => "2.0",
        }
    }

    /// Parses `1.0`, `1.1`, `2.0` or `2`.
    pub fn parse(version: &str) -> Result<Self, MessageError> {
        match version.trim() {
            "1.0" => Ok(ProtocolVersion::Http10),
            "1.1" => Ok(ProtocolVersion::Http11),
            "2.0" | "2" => Ok(ProtocolVersion::Http20),
            other => Err(MessageError::invalid_argument(format!(
                "unsupported HTTP protocol version {other:?}, must be one of 1.0, 1.1, 2.0"
            ))),
        }
    }
}

impl Display for ProtocolVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVersion {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ProtocolVersion> for http::Version {
    fn from(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::Http10 => http::Version::HTTP_10,
            ProtocolVersion::Http11 => http::Version::HTTP_11,
            ProtocolVersion::Http20 => http::Version::HTTP_2,
        }
    }
}

impl TryFrom<http::Version> for ProtocolVersion {
    type Error = MessageError;

    fn try_from(version: http::Version) -> Result<Self, Self::Error> {
        match version {
            http::Version::HTTP_10 => Ok(ProtocolVersion::Http10),
            http::Version::HTTP_11 => Ok(ProtocolVersion::Http11),
            http::Version::HTTP_2 => Ok(ProtocolVersion::Http20),
            other => Err(MessageError::invalid_argument(format!("unsupported HTTP protocol version {other:?}"))),
        }
    }
}

/// `httparse` reports the minor version of `HTTP/1.x` only.
impl TryFrom<u8> for ProtocolVersion {
    type Error = MessageError;

    fn try_from(minor: u8) -> Result<Self, Self::Error> {
        match minor {
            0 => Ok(ProtocolVersion::Http10),
            1 => Ok(ProtocolVersion::Http11),
            other => Err(MessageError::invalid_argument(format!("unsupported HTTP/1.{other}"))),
        }
    }
}
