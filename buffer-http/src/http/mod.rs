// buffer-http/src/http/mod.rs
use async_trait::async_trait;
use bytes::Bytes;

/// Error from HTTP request
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: Option<u16>,
    pub message: String,
}

impl HttpError {
    /// Failure before any response was received (DNS, connect, TLS, bad URL).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Failure tied to a received response status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(status) = self.status {
            write!(f, "HTTP error {}: {}", status, self.message)
        } else {
            write!(f, "HTTP error: {}", self.message)
        }
    }
}

impl std::error::Error for HttpError {}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` pairs
    Form(Vec<(String, String)>),
    /// JSON document
    Json(serde_json::Value),
    /// Raw bytes, sent as-is
    Raw(Vec<u8>),
}

/// A fully resolved outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }
}

/// Response as handed back by the transport, body not yet read
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn ResponseBody>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 4xx or 5xx
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }

    /// All values of a header, in the order received. Names compare case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Readable response body. Dropping it releases the underlying stream.
#[async_trait]
pub trait ResponseBody: Send {
    /// Read at most `max` bytes. An empty chunk means the body is exhausted.
    async fn read(&mut self, max: usize) -> Result<Bytes, HttpError>;

    /// Read everything that is left in one call
    async fn read_to_end(self: Box<Self>) -> Result<Bytes, HttpError>;
}

/// Body backed by an in-memory buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryBody {
    remaining: Bytes,
}

impl MemoryBody {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            remaining: content.into(),
        }
    }
}

#[async_trait]
impl ResponseBody for MemoryBody {
    async fn read(&mut self, max: usize) -> Result<Bytes, HttpError> {
        let n = max.min(self.remaining.len());
        Ok(self.remaining.split_to(n))
    }

    async fn read_to_end(self: Box<Self>) -> Result<Bytes, HttpError> {
        Ok(self.remaining)
    }
}

/// Generic HTTP client trait - users can implement their own
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a request and return the response with its body unread
    async fn send(&self, request: Request) -> Result<RawResponse, HttpError>;
}

#[cfg(feature = "reqwest")]
pub mod reqwest;

#[cfg(feature = "reqwest")]
pub use reqwest::ReqwestClient;
