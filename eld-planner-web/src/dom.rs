use js_sys::{Array, Function, Promise, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, Document, HtmlAnchorElement, Request, RequestInit, Response, Url,
    Window,
};

/// Retrieve the global `window` object.
///
/// # Panics
/// Panics if executed outside of a browser context where `window` is unavailable.
#[must_use]
pub fn window() -> Window {
    web_sys::window().expect("`window` should be available in web context")
}

/// Retrieve the document object for DOM interactions.
///
/// # Errors
/// Returns an error when the window has no document.
pub fn document() -> Result<Document, JsValue> {
    window()
        .document()
        .ok_or_else(|| JsValue::from_str("`document` unavailable"))
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Yield execution for the requested number of milliseconds.
///
/// # Errors
/// Returns an error if the timer cannot be scheduled or the underlying JavaScript promise rejects.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
pub async fn sleep_ms(duration_ms: i32) -> Result<(), JsValue> {
    let mut resolve_slot: Option<Function> = None;
    let promise = Promise::new(&mut |resolve, _reject| {
        resolve_slot = Some(resolve);
    });

    let resolve =
        resolve_slot.ok_or_else(|| JsValue::from_str("resolve function should be set"))?;
    let callback = Closure::once(move || {
        let _ = resolve.call0(&JsValue::UNDEFINED);
    });

    let handle = window().set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.as_ref().unchecked_ref(),
        duration_ms,
    )?;
    let _timeout = Timeout {
        handle,
        _callback: callback,
    };

    JsFuture::from(promise).await?;
    Ok(())
}

/// A scheduled `setTimeout`; dropping it before it fires clears the timer
/// and frees the callback.
struct Timeout {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for Timeout {
    fn drop(&mut self) {
        window().clear_timeout_with_handle(self.handle);
    }
}

/// Perform a fetch and return the browser `Response`, whatever its status.
///
/// A JSON `body` is sent with `Content-Type: application/json`.
///
/// # Errors
/// Returns an error if the request cannot be built or the fetch itself rejects.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
pub async fn fetch_response(
    method: &str,
    url: &str,
    body: Option<&str>,
) -> Result<Response, JsValue> {
    let init = RequestInit::new();
    init.set_method(method);
    if let Some(body) = body {
        init.set_body(&JsValue::from_str(body));
    }
    let request = Request::new_with_str_and_init(url, &init)?;
    if body.is_some() {
        request.headers().set("Content-Type", "application/json")?;
    }
    let resp_value = JsFuture::from(window().fetch_with_request(&request)).await?;
    resp_value.dyn_into::<Response>()
}

/// Read a response body as raw bytes.
///
/// # Errors
/// Returns an error if the body stream fails.
#[allow(clippy::future_not_send)]
pub async fn response_bytes(response: &Response) -> Result<Vec<u8>, JsValue> {
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Offer bytes to the user as a file download.
///
/// # Errors
/// Returns an error if the blob, object URL or anchor cannot be created.
pub fn save_file(bytes: &[u8], file_name: &str, mime: &str) -> Result<(), JsValue> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = document()?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    if let Some(body) = document.body() {
        body.append_child(&anchor)?;
        anchor.click();
        body.remove_child(&anchor)?;
    } else {
        anchor.click();
    }
    Url::revoke_object_url(&url)
}

/// Today's local date, from the browser clock.
#[must_use]
pub fn today() -> Option<chrono::NaiveDate> {
    let now = js_sys::Date::new_0();
    chrono::NaiveDate::from_ymd_opt(
        i32::try_from(now.get_full_year()).ok()?,
        now.get_month() + 1,
        now.get_date(),
    )
}

/// Ask the user to confirm a destructive action. A blocked dialog counts as "no".
#[must_use]
pub fn confirm(message: &str) -> bool {
    window().confirm_with_message(message).unwrap_or(false)
}
