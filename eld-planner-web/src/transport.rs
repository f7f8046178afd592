//! Browser implementations of the core transport and timer seams.

use crate::dom;
use async_trait::async_trait;
use eld_planner_core::{HttpClient, HttpRequest, HttpResponse, Timer, TransportError};
use std::time::Duration;

/// [`HttpClient`] over `window.fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClient;

#[async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let to_transport = |err: wasm_bindgen::JsValue| TransportError(dom::js_error_message(&err));
        let response = dom::fetch_response(
            request.method.as_str(),
            &request.url,
            request.body.as_deref(),
        )
        .await
        .map_err(to_transport)?;
        let body = dom::response_bytes(&response).await.map_err(to_transport)?;
        Ok(HttpResponse {
            status: response.status(),
            body,
        })
    }
}

/// [`Timer`] over `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        let ms = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = dom::sleep_ms(ms).await {
            log::warn!("debounce timer failed: {}", dom::js_error_message(&err));
        }
    }
}
