//! HTTP response with a validated status code and reason phrase.

use serde::Serialize;

use crate::error::MessageError;
use crate::header::HeaderBag;
use crate::protocol::status::check_status;
use crate::protocol::{HttpMessage, Message, ProtocolVersion, reason_phrase_for};
use crate::stream::ByteStream;
use crate::uri::Uri;

#[derive(Debug)]
pub struct Response {
    message: Message,
    status: u16,
    reason: String,
}

impl Default for Response {
    fn default() -> Self {
        Self { message: Message::default(), status: 200, reason: reason_phrase_for(200).to_owned() }
    }
}

fn reason_or_default(code: u16, reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => reason.to_owned(),
        _ => reason_phrase_for(code).to_owned(),
    }
}

impl Response {
    /// An empty response with `status` and its standard reason phrase.
    pub fn new(status: u16) -> Result<Self, MessageError> {
        Self::with_parts(status, HeaderBag::new(), None, ProtocolVersion::default(), None)
    }

    /// Fails with [`MessageError::InvalidArgument`] when `status` is outside
    /// `100..=599`. A missing or empty `reason` falls back to the standard
    /// phrase, which is `""` for unrecognized codes.
    pub fn with_parts(
        status: u16,
        headers: HeaderBag,
        body: Option<ByteStream>,
        version: ProtocolVersion,
        reason: Option<&str>,
    ) -> Result<Self, MessageError> {
        let status = check_status(status)?;
        Ok(Self { message: Message::new(version, headers, body), status, reason: reason_or_default(status, reason) })
    }

    /// A response whose body is `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T, status: u16) -> Result<Self, MessageError> {
        let body = serde_json::to_vec(value).map_err(MessageError::invalid_argument)?;
        let mut headers = HeaderBag::new();
        headers.insert("Content-Type", mime::APPLICATION_JSON.as_ref())?;
        Self::with_parts(status, headers, Some(ByteStream::new(body)), ProtocolVersion::default(), None)
    }

    /// A redirect to `uri`.
    ///
    /// With `seconds == 0` a `Location` header is set, otherwise a
    /// `Refresh: <seconds>; url=<uri>` header.
    pub fn redirect(uri: &Uri, status: u16, seconds: u32) -> Result<Self, MessageError> {
        let mut headers = HeaderBag::new();
        if seconds == 0 {
            headers.insert("Location", &uri.to_string())?;
        } else {
            headers.insert("Refresh", &format!("{seconds}; url={uri}"))?;
        }
        Self::with_parts(status, headers, Some(ByteStream::empty()), ProtocolVersion::default(), None)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason
    }

    pub fn with_status(mut self, status: u16, reason: Option<&str>) -> Result<Self, MessageError> {
        self.status = check_status(status)?;
        self.reason = reason_or_default(status, reason);
        Ok(self)
    }
}

impl HttpMessage for Response {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}
