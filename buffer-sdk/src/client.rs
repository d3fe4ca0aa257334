use crate::auth::AccessTokenProvider;
use crate::decode::{decode_body, mime_type, Decoded};
use crate::error::{DecodeFailure, Error, Result};
use crate::options::RequestOptions;
use buffer_http::{HttpClient, HttpError, ReqwestClient, Request, ResponseBody};
use bytes::{Bytes, BytesMut};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

pub const BUFFER_API_BASE_URL: &str = "https://api.bufferapp.com/1/";

/// Read size used when buffering a body in streaming mode
const STREAM_CHUNK_SIZE: usize = 1024;

/// Everything derived from one call. Nothing is kept on the executor.
#[derive(Debug, Clone)]
pub struct Execution {
    pub status: u16,
    pub mime_type: Option<String>,
    pub body: Bytes,
    pub decoded: Decoded,
}

#[derive(Debug)]
pub struct RequestExecutor<C: HttpClient = ReqwestClient> {
    http: C,
    base_url: Url,
}

impl RequestExecutor<ReqwestClient> {
    /// Build an executor for the Buffer API, authenticated with the provider's token
    pub fn new(auth: &impl AccessTokenProvider) -> Result<Self> {
        // Nothing has gone over the wire yet, so this is a credential problem
        let http =
            ReqwestClient::with_token(&auth.access_token()).map_err(|e| Error::Config(e.message))?;
        Self::with_client(http, BUFFER_API_BASE_URL)
    }
}

impl<C: HttpClient> RequestExecutor<C> {
    /// Use an arbitrary transport. `base_url` should end with `/` so relative
    /// paths resolve beneath it.
    pub fn with_client(http: C, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", base_url, e)))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send a request and decode the body, falling back to `{}` when the
    /// body is empty or not a JSON document.
    pub async fn execute(&self, method: &str, path: &str, options: RequestOptions) -> Result<Value> {
        let execution = self.send(method, path, options).await?;

        match &execution.decoded {
            Decoded::Failed(DecodeFailure::Empty) => {
                debug!(status = execution.status, "empty response body");
            }
            Decoded::Failed(failure) => {
                warn!(
                    status = execution.status,
                    mime_type = ?execution.mime_type,
                    reason = %failure,
                    "undecodable response body, returning empty document"
                );
            }
            Decoded::Document(_) => {}
        }

        Ok(execution.decoded.into_lenient())
    }

    /// Like [`execute`](Self::execute), but a body that is not a JSON
    /// document is an error.
    pub async fn execute_strict(
        &self,
        method: &str,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value> {
        let execution = self.send(method, path, options).await?;
        Ok(execution.decoded.into_result()?)
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.execute("GET", path, RequestOptions::default()).await
    }

    pub async fn post_form<K, V>(
        &self,
        path: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Value>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.execute("POST", path, RequestOptions::new().form(pairs))
            .await
    }

    /// Issue the request, buffer the body and return the whole per-call record
    pub async fn send(&self, method: &str, path: &str, options: RequestOptions) -> Result<Execution> {
        let RequestOptions {
            headers,
            query,
            body,
            stream,
            http_errors,
        } = options;

        let request = Request {
            method: normalize_method(method)?,
            url: self.resolve(path)?.into(),
            headers,
            query,
            body,
        };

        debug!(method = %request.method, url = %request.url, stream, "sending request");

        let response = self.http.send(request).await?;
        let status = response.status;
        let error_status = response.is_error_status();
        let mime_type = mime_type(response.header_values("Content-Type"));

        let body = read_body(response.body, stream).await?;

        if http_errors && error_status {
            return Err(HttpError::status(status, String::from_utf8_lossy(&body)).into());
        }

        debug!(status, mime_type = ?mime_type, bytes = body.len(), "received response");

        let decoded = decode_body(&body);
        Ok(Execution {
            status,
            mime_type,
            body,
            decoded,
        })
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidRequest(format!("cannot resolve path {:?}: {}", path, e)))
    }
}

fn normalize_method(method: &str) -> Result<String> {
    let method = method.trim();
    if method.is_empty() {
        return Err(Error::InvalidRequest("HTTP method must not be empty".to_string()));
    }
    Ok(method.to_ascii_uppercase())
}

/// Buffer the whole body. The body is dropped, releasing the stream, before returning.
async fn read_body(mut body: Box<dyn ResponseBody>, stream: bool) -> std::result::Result<Bytes, HttpError> {
    if !stream {
        return body.read_to_end().await;
    }

    let mut content = BytesMut::new();
    loop {
        let chunk = body.read(STREAM_CHUNK_SIZE).await?;
        if chunk.is_empty() {
            break;
        }
        content.extend_from_slice(&chunk);
    }
    drop(body);

    Ok(content.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use buffer_http::{MemoryBody, RawResponse};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingClient {
        requests: Mutex<Vec<Request>>,
    }

    #[async_trait]
    impl HttpClient for RecordingClient {
        async fn send(&self, request: Request) -> std::result::Result<RawResponse, HttpError> {
            self.requests.lock().unwrap().push(request);
            Ok(RawResponse {
                status: 200,
                headers: vec![],
                body: Box::new(MemoryBody::new(&b"{}"[..])),
            })
        }
    }

    fn executor() -> RequestExecutor<RecordingClient> {
        RequestExecutor::with_client(RecordingClient::default(), BUFFER_API_BASE_URL).unwrap()
    }

    fn last_request(executor: &RequestExecutor<RecordingClient>) -> Request {
        executor.http.requests.lock().unwrap().last().cloned().unwrap()
    }

    #[test]
    fn test_buffer_base_url() {
        assert_eq!(BUFFER_API_BASE_URL, "https://api.bufferapp.com/1/");
    }

    #[tokio::test]
    async fn test_relative_path_resolves_under_base_url() {
        let executor = executor();
        executor.get("profiles/4eb854340acb04e870000010.json").await.unwrap();
        assert_eq!(
            last_request(&executor).url,
            "https://api.bufferapp.com/1/profiles/4eb854340acb04e870000010.json"
        );
    }

    #[tokio::test]
    async fn test_absolute_path_replaces_base_path() {
        let executor = executor();
        executor.get("/oauth2/token.json").await.unwrap();
        assert_eq!(
            last_request(&executor).url,
            "https://api.bufferapp.com/oauth2/token.json"
        );
    }

    #[tokio::test]
    async fn test_method_is_upper_cased() {
        let executor = executor();
        executor
            .execute("post", "updates/create.json", RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(last_request(&executor).method, "POST");
    }

    #[tokio::test]
    async fn test_empty_method_is_rejected_before_sending() {
        let executor = executor();
        let err = executor
            .execute("  ", "profiles.json", RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(executor.http.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_options_pass_through_to_transport() {
        let executor = executor();
        executor
            .post_form("updates/create.json", [("text", "hello")])
            .await
            .unwrap();
        executor
            .execute(
                "GET",
                "profiles.json",
                RequestOptions::new().header("Accept", "application/json").query("page", "2"),
            )
            .await
            .unwrap();

        let requests = executor.http.requests.lock().unwrap();
        assert_eq!(
            requests[0].body,
            Some(buffer_http::RequestBody::Form(vec![(
                "text".to_string(),
                "hello".to_string()
            )]))
        );
        assert_eq!(
            requests[1].headers,
            vec![("Accept".to_string(), "application/json".to_string())]
        );
        assert_eq!(requests[1].query, vec![("page".to_string(), "2".to_string())]);
    }

    #[test]
    fn test_new_uses_buffer_base_url() {
        let executor = RequestExecutor::new(&"abc123").unwrap();
        assert_eq!(executor.base_url().as_str(), BUFFER_API_BASE_URL);
    }

    #[test]
    fn test_unusable_token_is_config_error() {
        let err = RequestExecutor::new(&"line\nbreak").unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {:?}", err);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        let err = RequestExecutor::with_client(RecordingClient::default(), "not a url").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_streamed_read_matches_whole_read() {
        let content: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();

        let streamed = read_body(Box::new(MemoryBody::new(content.clone())), true)
            .await
            .unwrap();
        let whole = read_body(Box::new(MemoryBody::new(content.clone())), false)
            .await
            .unwrap();

        assert_eq!(streamed, whole);
        assert_eq!(streamed.as_ref(), content.as_slice());
    }
}
