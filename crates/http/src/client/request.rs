//! Outgoing request descriptor

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::time::Duration;

use super::error::ClientError;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Method, target, headers and body of a request, kept replayable so the
/// request can be re-sent after a token refresh.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Absolute URL, or a path resolved against the client's base URL
    pub url: String,
    headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Per-request timeout overriding the client-wide one
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Set a header, replacing any earlier value with the same name (case-insensitive)
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, ClientError> {
        let body = serde_json::to_vec(value)?;
        Ok(self.body(body))
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Headers as sent: caller headers, `Authorization` overwritten when a token
    /// is given, and `Content-Type` defaulted only when the caller left it unset.
    pub fn outgoing_headers(&self, access_token: Option<&str>) -> Result<HeaderMap, ClientError> {
        let mut map = HeaderMap::with_capacity(self.headers.len() + 2);
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::InvalidHeader(name.clone()))?;
            map.insert(header_name, header_value);
        }

        if let Some(token) = access_token {
            let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ClientError::InvalidHeader(AUTHORIZATION.to_string()))?;
            bearer.set_sensitive(true);
            map.insert(AUTHORIZATION, bearer);
        }

        if !map.contains_key(CONTENT_TYPE) {
            map.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        }

        Ok(map)
    }
}
