use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use super::error::RequestError;
use super::request::{OutgoingRequest, RawResponse};

/// Sends an [`OutgoingRequest`] and hands back whatever the server answered.
///
/// Only a missing answer is an error here; HTTP error statuses come back as a
/// normal [`RawResponse`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, RequestError>;
}

/// Browser Fetch API.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, RequestError> {
        fetch(&request)
            .await
            .map_err(|e| RequestError::Transport(describe_js_error(&e)))
    }
}

async fn fetch(request: &OutgoingRequest) -> Result<RawResponse, JsValue> {
    let opts = RequestInit::new();
    opts.set_method(request.method.as_str());
    opts.set_mode(RequestMode::Cors);

    let headers = Headers::new()?;
    for (name, value) in &request.headers {
        headers.append(name, value)?;
    }
    opts.set_headers(&headers);

    if let Some(body) = &request.body {
        opts.set_body(&JsValue::from_str(body));
    }

    let js_request = Request::new_with_str_and_init(&request.url, &opts)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&js_request)).await?;
    let resp: Response = resp_value.dyn_into()?;

    // Body as text – decoding is done by the caller.
    let text = JsFuture::from(resp.text()?).await?;
    Ok(RawResponse::new(resp.status(), text.as_string().unwrap_or_default()))
}

pub(crate) fn describe_js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
