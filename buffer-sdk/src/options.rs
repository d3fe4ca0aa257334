use buffer_http::RequestBody;

/// Per-call options. Headers, query and body go to the transport untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Buffer the body by reading fixed-size chunks instead of in one call
    pub stream: bool,
    /// Treat 4xx and 5xx statuses as transport errors
    pub http_errors: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            stream: false,
            http_errors: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body = Some(RequestBody::Form(pairs));
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(RequestBody::Raw(bytes.into()));
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn http_errors(mut self, http_errors: bool) -> Self {
        self.http_errors = http_errors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RequestOptions::default();
        assert!(!options.stream);
        assert!(options.http_errors);
        assert!(options.body.is_none());
    }

    #[test]
    fn test_form_replaces_previous_body() {
        let options = RequestOptions::new()
            .json(serde_json::json!({"a": 1}))
            .form([("text", "hi"), ("now", "true")]);
        assert_eq!(
            options.body,
            Some(RequestBody::Form(vec![
                ("text".to_string(), "hi".to_string()),
                ("now".to_string(), "true".to_string()),
            ]))
        );
    }
}
