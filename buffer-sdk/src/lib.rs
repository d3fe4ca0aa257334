pub mod auth;
pub mod client;
pub mod decode;
pub mod error;
pub mod options;

pub use auth::AccessTokenProvider;
pub use client::{Execution, RequestExecutor, BUFFER_API_BASE_URL};
pub use decode::Decoded;
pub use error::{DecodeFailure, Error, Result};
pub use options::RequestOptions;

// Re-export transport types for convenience
pub use buffer_http::{HttpClient, HttpError, MemoryBody, RawResponse, Request, RequestBody, ReqwestClient};
