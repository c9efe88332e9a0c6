use crate::error::MessageError;
use crate::header::HeaderBag;
use crate::protocol::ProtocolVersion;
use crate::stream::ByteStream;

/// The parts every HTTP message shares: protocol version, headers and body.
///
/// The body is created lazily; a message that never touched its body holds
/// no stream at all.
#[derive(Debug, Default)]
pub struct Message {
    version: ProtocolVersion,
    headers: HeaderBag,
    body: Option<ByteStream>,
}

impl Message {
    pub fn new(version: ProtocolVersion, headers: HeaderBag, body: Option<ByteStream>) -> Self {
        Self { version, headers, body }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn set_version(&mut self, version: ProtocolVersion) {
        self.version = version;
    }

    pub fn headers(&self) -> &HeaderBag {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderBag {
        &mut self.headers
    }

    /// The body, if one was ever set or materialized.
    pub fn body(&self) -> Option<&ByteStream> {
        self.body.as_ref()
    }

    /// The body, materializing an empty stream on first access.
    pub fn body_mut(&mut self) -> &mut ByteStream {
        self.body.get_or_insert_with(ByteStream::empty)
    }

    pub fn set_body(&mut self, body: ByteStream) {
        self.body = Some(body);
    }

    /// Moves the body out, leaving the message without one.
    pub fn take_body(&mut self) -> ByteStream {
        self.body.take().unwrap_or_default()
    }
}

/// Read and copy-on-write access shared by [`Request`](crate::protocol::Request),
/// [`Response`](crate::protocol::Response) and
/// [`ServerRequest`](crate::protocol::ServerRequest).
///
/// Each `with_*` method consumes the message and returns the modified one, so
/// a derived message never aliases the state of the one it came from.
pub trait HttpMessage: Sized {
    fn message(&self) -> &Message;

    fn message_mut(&mut self) -> &mut Message;

    fn protocol_version(&self) -> ProtocolVersion {
        self.message().version()
    }

    fn headers(&self) -> &HeaderBag {
        self.message().headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderBag {
        self.message_mut().headers_mut()
    }

    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    fn header_line(&self, name: &str) -> String {
        self.headers().get_line(name)
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().has(name)
    }

    fn body(&mut self) -> &mut ByteStream {
        self.message_mut().body_mut()
    }

    fn take_body(&mut self) -> ByteStream {
        self.message_mut().take_body()
    }

    /// `true` when the body holds no bytes. A body of unknown size is not empty.
    fn is_empty(&mut self) -> bool {
        self.body().size().is_some_and(|size| size < 1)
    }

    fn is_not_empty(&mut self) -> bool {
        self.body().size().is_some_and(|size| size > 0)
    }

    fn with_protocol_version(mut self, version: &str) -> Result<Self, MessageError> {
        let version = ProtocolVersion::parse(version)?;
        self.message_mut().set_version(version);
        Ok(self)
    }

    /// Replaces header `name` with `values`.
    fn with_header<I, V>(mut self, name: &str, values: I) -> Result<Self, MessageError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        self.headers_mut().replace(name, values)?;
        Ok(self)
    }

    /// Appends `values` to header `name`.
    fn with_added_header<I, V>(mut self, name: &str, values: I) -> Result<Self, MessageError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        self.headers_mut().set_all(name, values)?;
        Ok(self)
    }

    fn without_header(mut self, name: &str) -> Self {
        self.headers_mut().remove(name);
        self
    }

    fn with_body(mut self, body: ByteStream) -> Self {
        self.message_mut().set_body(body);
        self
    }
}
