pub mod http;

pub use http::{
    HttpClient, HttpError, MemoryBody, RawResponse, Request, RequestBody, ResponseBody,
};

// Re-export reqwest client when feature is enabled
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
