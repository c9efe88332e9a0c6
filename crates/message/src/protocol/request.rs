//! Outbound HTTP request.

use http::Method;

use crate::ensure;
use crate::error::MessageError;
use crate::header::HeaderBag;
use crate::protocol::{HttpMessage, Message, ProtocolVersion};
use crate::stream::ByteStream;
use crate::uri::Uri;

/// An HTTP request: a [`Message`] plus method, [`Uri`] and an optional
/// request-target override.
///
/// A `Host` header is derived from the uri at construction unless one was
/// supplied.
#[derive(Debug)]
pub struct Request {
    message: Message,
    method: Method,
    uri: Uri,
    request_target: Option<String>,
}

/// Upper-cases `method` and checks it is a token.
fn parse_method(method: &str) -> Result<Method, MessageError> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| MessageError::invalid_argument(format!("invalid HTTP method {method:?}")))
}

/// `host[:port]` of `uri`, or `None` when it has no host.
fn host_header_value(uri: &Uri) -> Option<String> {
    let host = uri.host();
    if host.is_empty() {
        return None;
    }

    Some(match uri.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

impl Request {
    pub fn new(method: &str, uri: Uri) -> Result<Self, MessageError> {
        Self::with_parts(method, uri, HeaderBag::new(), None, ProtocolVersion::default())
    }

    pub fn with_parts(
        method: &str,
        uri: Uri,
        headers: HeaderBag,
        body: Option<ByteStream>,
        version: ProtocolVersion,
    ) -> Result<Self, MessageError> {
        let mut request = Self {
            message: Message::new(version, headers, body),
            method: parse_method(method)?,
            uri,
            request_target: None,
        };
        if !request.has_header("Host") {
            request.update_host_from_uri()?;
        }
        Ok(request)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The explicit target if one was set, otherwise the uri path (or `/`)
    /// followed by `?query` when the query is non-empty.
    pub fn request_target(&self) -> String {
        if let Some(target) = &self.request_target {
            return target.clone();
        }

        let path = match self.uri.path() {
            "" => "/",
            path => path,
        };
        match self.uri.query() {
            "" => path.to_owned(),
            query => format!("{path}?{query}"),
        }
    }

    pub fn with_method(mut self, method: &str) -> Result<Self, MessageError> {
        self.method = parse_method(method)?;
        Ok(self)
    }

    /// Overrides the request target. Whitespace is rejected.
    pub fn with_request_target(mut self, target: &str) -> Result<Self, MessageError> {
        ensure!(
            !target.chars().any(char::is_whitespace),
            MessageError::invalid_argument("invalid request target provided; cannot contain whitespace")
        );
        self.request_target = Some(target.to_owned());
        Ok(self)
    }

    /// Replaces the uri.
    ///
    /// Unless `preserve_host` is set and a `Host` header already exists, the
    /// `Host` header is rewritten from the new uri and moved to the front.
    pub fn with_uri(mut self, uri: Uri, preserve_host: bool) -> Result<Self, MessageError> {
        self.set_uri(uri, preserve_host)?;
        Ok(self)
    }

    pub fn set_uri(&mut self, uri: Uri, preserve_host: bool) -> Result<(), MessageError> {
        if self.uri == uri {
            return Ok(());
        }

        self.uri = uri;
        if !preserve_host || !self.has_header("Host") {
            self.update_host_from_uri()?;
        }
        Ok(())
    }

    fn update_host_from_uri(&mut self) -> Result<(), MessageError> {
        match host_header_value(&self.uri) {
            Some(host) => self.message.headers_mut().set_front("Host", [host]),
            None => Ok(()),
        }
    }

    pub fn is_method(&self, methods: &[&str]) -> bool {
        methods.iter().any(|method| self.method.as_str().eq_ignore_ascii_case(method))
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    pub fn is_put(&self) -> bool {
        self.method == Method::PUT
    }

    pub fn is_delete(&self) -> bool {
        self.method == Method::DELETE
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    pub fn is_patch(&self) -> bool {
        self.method == Method::PATCH
    }

    /// Splits the request into its shared message parts and request line.
    pub(crate) fn into_parts(self) -> (Message, Method, Uri, Option<String>) {
        (self.message, self.method, self.uri, self.request_target)
    }
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}
