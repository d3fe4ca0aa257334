// buffer-http/src/http/reqwest.rs
use super::{HttpClient, HttpError, RawResponse, Request, RequestBody, ResponseBody};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;

#[cfg(feature = "reqwest")]
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Build a client that sends `Authorization: Bearer <token>` on every request
    pub fn with_token(token: &str) -> Result<Self, HttpError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| HttpError::transport(format!("invalid access token: {}", e)))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| HttpError::transport(e.to_string()))?;

        Ok(Self { inner })
    }
}

#[cfg(feature = "reqwest")]
impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: Request) -> Result<RawResponse, HttpError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| HttpError::transport(format!("invalid method {:?}: {}", request.method, e)))?;

        let mut req = self.inner.request(method, &request.url);

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        req = match request.body {
            Some(RequestBody::Form(pairs)) => req.form(&pairs),
            Some(RequestBody::Json(value)) => req.json(&value),
            Some(RequestBody::Raw(bytes)) => req.body(bytes),
            None => req,
        };

        let resp = req.send().await.map_err(|e| {
            tracing::debug!(url = %request.url, error = %e, "request failed before response");
            HttpError::transport(e.to_string())
        })?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Ok(RawResponse {
            status,
            headers,
            body: Box::new(ReqwestBody {
                inner: resp,
                pending: Bytes::new(),
                status,
            }),
        })
    }
}

/// Streams a reqwest response, handing out frames sliced to the requested size
#[cfg(feature = "reqwest")]
struct ReqwestBody {
    inner: reqwest::Response,
    pending: Bytes,
    status: u16,
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl ResponseBody for ReqwestBody {
    async fn read(&mut self, max: usize) -> Result<Bytes, HttpError> {
        while self.pending.is_empty() {
            match self
                .inner
                .chunk()
                .await
                .map_err(|e| HttpError::status(self.status, e.to_string()))?
            {
                Some(chunk) => self.pending = chunk,
                None => return Ok(Bytes::new()),
            }
        }

        let n = max.min(self.pending.len());
        Ok(self.pending.split_to(n))
    }

    async fn read_to_end(self: Box<Self>) -> Result<Bytes, HttpError> {
        let ReqwestBody {
            inner,
            pending,
            status,
        } = *self;

        let rest = inner
            .bytes()
            .await
            .map_err(|e| HttpError::status(status, e.to_string()))?;

        if pending.is_empty() {
            return Ok(rest);
        }

        let mut all = BytesMut::with_capacity(pending.len() + rest.len());
        all.extend_from_slice(&pending);
        all.extend_from_slice(&rest);
        Ok(all.freeze())
    }
}
