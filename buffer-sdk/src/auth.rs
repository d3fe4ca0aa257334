/// Anything that can hand out a bearer token for the Buffer API.
///
/// The executor asks once, at construction, and keeps the client it builds
/// from the answer.
pub trait AccessTokenProvider {
    fn access_token(&self) -> String;
}

impl AccessTokenProvider for String {
    fn access_token(&self) -> String {
        self.clone()
    }
}

impl AccessTokenProvider for &str {
    fn access_token(&self) -> String {
        (*self).to_string()
    }
}
