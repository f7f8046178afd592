//! `reqwest` implementation of the core transport seam.

use async_trait::async_trait;
use eld_planner_core::{HttpClient, HttpRequest, HttpResponse, Method, TransportError};
use reqwest::header::CONTENT_TYPE;

#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

const fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait(?Send)]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(reqwest_method(request.method), &request.url);
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        log::trace!("{} {} -> {status}", request.method.as_str(), request.url);
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
