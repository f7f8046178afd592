//! Transport seam shared by the planning-service client and the map provider.
//!
//! Platforms supply an [`HttpClient`]: the browser wraps `fetch`, the native
//! driver wraps `reqwest`. Futures are `?Send` because browser futures are not.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// JSON body; sent with `Content-Type: application/json`.
    pub body: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            url: url.into(),
            body: None,
        }
    }

    #[must_use]
    pub fn post_json(url: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The request never produced a response (DNS, refused connection, CORS, ...).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("network error: {0}")]
pub struct TransportError(pub String);

#[async_trait(?Send)]
pub trait HttpClient {
    /// Send a request and return whatever status the server answered with.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait(?Send)]
impl<T: HttpClient + ?Sized> HttpClient for std::rc::Rc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Join a base URL and a path without doubling or dropping the slash.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url("http://localhost:8000/api/", "/trips/plan/"),
            "http://localhost:8000/api/trips/plan/"
        );
        assert_eq!(join_url("http://x/api", "health/"), "http://x/api/health/");
    }

    #[test]
    fn success_range_is_2xx() {
        let ok = HttpResponse {
            status: 204,
            body: vec![],
        };
        let bad = HttpResponse {
            status: 302,
            body: vec![],
        };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
