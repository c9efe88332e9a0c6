//! Inbound request as seen by a server.

use http::Method;
use serde_json::Value;

use crate::ensure;
use crate::error::MessageError;
use crate::header::HeaderBag;
use crate::protocol::{HttpMessage, Message, ParamBag, ProtocolVersion, Request, UploadedFile};
use crate::stream::ByteStream;
use crate::uri::Uri;

/// A [`Request`] plus the per-call context a server collects for it.
///
/// One value is built per inbound call and handed to whatever needs it;
/// there is no process-wide "current request".
#[derive(Debug)]
pub struct ServerRequest {
    request: Request,
    server_params: ParamBag<String>,
    cookie_params: ParamBag<String>,
    query_params: ParamBag<String>,
    attributes: ParamBag<Value>,
    parsed_body: Option<Value>,
    uploaded_files: Vec<(String, UploadedFile)>,
}

/// Splits a `Cookie` header line into name/value pairs.
///
/// Pairs without `=` and empty names are skipped.
pub fn parse_cookie_header(line: &str) -> ParamBag<String> {
    line.split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim(), value.trim().trim_matches('"')))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name, value.to_owned()))
        .collect()
}

impl ServerRequest {
    pub fn new(method: &str, uri: Uri) -> Result<Self, MessageError> {
        Ok(Self::from_request(Request::new(method, uri)?, ParamBag::new()))
    }

    pub fn with_parts(
        method: &str,
        uri: Uri,
        headers: HeaderBag,
        body: Option<ByteStream>,
        version: ProtocolVersion,
        server_params: ParamBag<String>,
    ) -> Result<Self, MessageError> {
        let request = Request::with_parts(method, uri, headers, body, version)?;
        Ok(Self::from_request(request, server_params))
    }

    /// Wraps `request`; cookie params are taken from its `Cookie` headers.
    pub fn from_request(request: Request, server_params: ParamBag<String>) -> Self {
        let mut cookie_params = ParamBag::new();
        for line in request.header("Cookie") {
            cookie_params.merge(parse_cookie_header(line));
        }

        Self {
            request,
            server_params,
            cookie_params,
            query_params: ParamBag::new(),
            attributes: ParamBag::new(),
            parsed_body: None,
            uploaded_files: Vec::new(),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn request_target(&self) -> String {
        self.request.request_target()
    }

    pub fn with_uri(mut self, uri: Uri, preserve_host: bool) -> Result<Self, MessageError> {
        self.request.set_uri(uri, preserve_host)?;
        Ok(self)
    }

    pub fn server_params(&self) -> &ParamBag<String> {
        &self.server_params
    }

    pub fn cookie_params(&self) -> &ParamBag<String> {
        &self.cookie_params
    }

    pub fn with_cookie_params(mut self, cookies: ParamBag<String>) -> Self {
        self.cookie_params = cookies;
        self
    }

    pub fn query_params(&self) -> &ParamBag<String> {
        &self.query_params
    }

    pub fn with_query_params(mut self, query: ParamBag<String>) -> Self {
        self.query_params = query;
        self
    }

    /// Decodes `application/x-www-form-urlencoded` `query` into the query params.
    pub fn with_query_string(mut self, query: &str) -> Result<Self, MessageError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).map_err(MessageError::invalid_argument)?;
        self.query_params = pairs.into_iter().collect();
        Ok(self)
    }

    pub fn attributes(&self) -> &ParamBag<Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.set(name, value);
        self
    }

    pub fn without_attribute(mut self, name: &str) -> Self {
        self.attributes.remove(name);
        self
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// Sets the deserialized body. Only objects, arrays and null are accepted;
    /// null clears it.
    pub fn with_parsed_body(mut self, data: Value) -> Result<Self, MessageError> {
        ensure!(
            matches!(data, Value::Object(_) | Value::Array(_) | Value::Null),
            MessageError::invalid_argument("parsed body must be an object, an array or null")
        );
        self.parsed_body = (!data.is_null()).then_some(data);
        Ok(self)
    }

    pub fn uploaded_files(&self) -> &[(String, UploadedFile)] {
        &self.uploaded_files
    }

    pub fn uploaded_files_mut(&mut self) -> &mut [(String, UploadedFile)] {
        &mut self.uploaded_files
    }

    /// The first uploaded file under form field `field`.
    pub fn uploaded_file(&mut self, field: &str) -> Option<&mut UploadedFile> {
        self.uploaded_files.iter_mut().find(|(name, _)| name == field).map(|(_, file)| file)
    }

    pub fn with_uploaded_files(mut self, files: Vec<(String, UploadedFile)>) -> Self {
        self.uploaded_files = files;
        self
    }
}

impl HttpMessage for ServerRequest {
    fn message(&self) -> &Message {
        self.request.message()
    }

    fn message_mut(&mut self) -> &mut Message {
        self.request.message_mut()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request() -> ServerRequest {
        ServerRequest::new("GET", Uri::parse("http://example.com/items?page=2").unwrap()).unwrap()
    }

    #[test]
    fn delegates_to_request() {
        let request = request();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.request_target(), "/items?page=2");
        assert_eq!(request.header("host"), ["example.com"]);
    }

    #[test]
    fn cookies_from_header() {
        let mut headers = HeaderBag::new();
        headers.append("Cookie", "session=abc; theme=\"dark\"").unwrap();
        headers.append("cookie", "lang=en; broken; =x").unwrap();

        let request = ServerRequest::with_parts(
            "GET",
            Uri::parse("/").unwrap(),
            headers,
            None,
            ProtocolVersion::Http11,
            ParamBag::new(),
        )
        .unwrap();

        let cookies = request.cookie_params();
        assert_eq!(cookies.get("session").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(cookies.get("lang").map(String::as_str), Some("en"));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn query_string_is_decoded() {
        let request = request().with_query_string("page=2&q=hello+world&tag=a%26b").unwrap();
        let query = request.query_params();
        assert_eq!(query.get("page").map(String::as_str), Some("2"));
        assert_eq!(query.get("q").map(String::as_str), Some("hello world"));
        assert_eq!(query.get("tag").map(String::as_str), Some("a&b"));
    }

    #[test]
    fn attributes() {
        let request = request().with_attribute("user_id", json!(42)).with_attribute("role", json!("admin"));
        assert_eq!(request.attribute("user_id"), Some(&json!(42)));

        let request = request.without_attribute("user_id");
        assert!(request.attribute("user_id").is_none());
        assert_eq!(request.attributes().len(), 1);
    }

    #[test]
    fn parsed_body_shape() {
        let request = request().with_parsed_body(json!({"name": "x"})).unwrap();
        assert_eq!(request.parsed_body(), Some(&json!({"name": "x"})));

        let request = request.with_parsed_body(Value::Null).unwrap();
        assert!(request.parsed_body().is_none());

        let err = request.with_parsed_body(json!("scalar")).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn uploaded_files() {
        let mut request = request().with_uploaded_files(vec![
            ("avatar".to_owned(), UploadedFile::from_stream(ByteStream::new("png"), Some(3))),
        ]);

        assert_eq!(request.uploaded_files().len(), 1);
        let upload = request.uploaded_file("avatar").unwrap();
        assert_eq!(upload.stream().unwrap().to_text(), "png");
        assert!(request.uploaded_file("missing").is_none());
    }
}
