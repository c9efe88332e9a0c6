use serde::Deserialize;

use crate::codec::{MAX_HEADER_BYTES, MAX_HEADER_NUM};

/// Settings for [`TcpTransport`](crate::transport::TcpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// sent as `User-Agent` unless the request carries its own
    pub user_agent: String,
    pub max_header_bytes: usize,
    pub max_headers: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("micro-message/", env!("CARGO_PKG_VERSION")).to_owned(),
            max_header_bytes: MAX_HEADER_BYTES,
            max_headers: MAX_HEADER_NUM,
        }
    }
}

impl TransportConfig {
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        user_agent.clone_into(&mut self.user_agent);
        self
    }

    pub fn with_header_limits(mut self, max_header_bytes: usize, max_headers: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self.max_headers = max_headers;
        self
    }
}
