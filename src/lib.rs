use std::rc::Rc;

use js_sys::{Function, Promise};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::Document;

pub mod constants;
pub mod cookies;
pub mod logging;
pub mod network;
pub mod page;
pub mod session;
pub mod ui;

use cookies::{CookieJar, DocumentCookies};
use network::transport::describe_js_error;
use network::{FetchTransport, Method, PanelClient, PanelConfig, RequestError};
use ui::{DomAlerts, Feedback};

// Entry point, runs when the WASM module is instantiated
#[wasm_bindgen(start)]
pub fn start() {
    // Initialize better panic messages
    console_error_panic_hook::set_once();
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document on window"))
}

/// Client wired to the browser: `addr` from localStorage, cookies of this
/// page, DOM banners and the shell's login prompt.
fn browser_client() -> Result<PanelClient, RequestError> {
    let config = PanelConfig::from_local_storage()
        .map_err(|e| RequestError::InvalidRequest(describe_js_error(&e)))?;
    Ok(PanelClient::new(config, FetchTransport, Rc::new(DocumentCookies), Rc::new(DomAlerts))
        .on_session_invalid(ui::login::notify_session_invalid))
}

fn prepare(method: &str, parameters: JsValue) -> Result<(PanelClient, Method, Value), RequestError> {
    let method: Method = method.parse().map_err(RequestError::InvalidRequest)?;
    let parameters = if parameters.is_undefined() {
        Value::Null
    } else {
        serde_wasm_bindgen::from_value(parameters)
            .map_err(|e| RequestError::InvalidRequest(e.to_string()))?
    };
    Ok((browser_client()?, method, parameters))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// `null` and `undefined` become `None`.
fn optional_json(data: JsValue) -> Option<Value> {
    if data.is_null() || data.is_undefined() {
        return None;
    }
    serde_wasm_bindgen::from_value(data).ok()
}

// ---------------------------------------------------------------------------
// Page lifecycle
// ---------------------------------------------------------------------------

/// Render the initial page payload into `#container`.
#[wasm_bindgen]
pub fn init(starting_data: Option<String>) {
    if let Ok(document) = document() {
        page::init(&document, starting_data.as_deref());
    }
}

/// Copy typed values into the markup before the page is captured.
#[wasm_bindgen]
pub fn unload() -> Result<u32, JsValue> {
    page::unload(&document()?).map(|n| n as u32)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send a JSON request to `{addr}/{url}` and call `callback(data)` when it
/// succeeds.  Failures are reported through the error banner (and the login
/// prompt when the session is gone); `callback` is not called then.
#[wasm_bindgen]
pub fn request(method: &str, url: &str, parameters: JsValue, callback: Function) {
    let (client, method, parameters) = match prepare(method, parameters) {
        Ok(prepared) => prepared,
        Err(err) => {
            logging::error(&format!("Cannot send request to {}: {}", url, err));
            DomAlerts.error(err.banner_message());
            return;
        }
    };

    let url = url.to_string();
    spawn_local(async move {
        let Ok(data) = client.request(method, &url, &parameters).await else {
            return;
        };
        let delivered = to_js(&data).and_then(|js| callback.call1(&JsValue::NULL, &js));
        if let Err(e) = delivered {
            logging::error(&format!("Callback for {} failed: {:?}", url, e));
        }
    });
}

/// Promise flavour of [`request`]: resolves with the data, rejects with
/// `{kind, message, invalidToken, status?}`.
#[wasm_bindgen(js_name = requestAsync)]
pub fn request_async(method: String, url: String, parameters: JsValue) -> Promise {
    future_to_promise(async move {
        let (client, method, parameters) = prepare(&method, parameters)?;
        let data = client.request(method, &url, &parameters).await?;
        to_js(&data)
    })
}

/// Log in and store the issued token; the login dialog is closed and the
/// sections are loaded on success.
#[wasm_bindgen]
pub fn authenticate(username: String, password: String) -> Promise {
    future_to_promise(async move {
        let client = browser_client()?;
        let token_out = client.authenticate(&username, &password).await?;
        let document = document()?;
        ui::login::hide_login_modal(&document)?;
        ui::login::load_sections()?;
        to_js(&token_out)
    })
}

/// Fetch the control API address from the GUI server (`GET {origin}/api`)
/// and store it under `addr`.  Defaults to this page's origin.
#[wasm_bindgen(js_name = discoverAddr)]
pub fn discover_addr(gui_origin: Option<String>) -> Promise {
    future_to_promise(async move {
        let origin = match gui_origin {
            Some(origin) => origin,
            None => web_sys::window()
                .ok_or_else(|| JsValue::from_str("no global window exists"))?
                .location()
                .origin()?,
        };
        let config = network::discover_addr(&FetchTransport, &origin).await?;
        config.store()?;
        logging::log(&format!("Control API at {}", config.base_url()));
        Ok(JsValue::from_str(config.base_url()))
    })
}

// ---------------------------------------------------------------------------
// Login gate
// ---------------------------------------------------------------------------

#[wasm_bindgen(js_name = showLogin)]
pub fn show_login() -> Result<(), JsValue> {
    ui::login::show_login(&document()?, &DocumentCookies)
}

#[wasm_bindgen(js_name = hideLogin)]
pub fn hide_login() -> Result<(), JsValue> {
    ui::login::hide_login_modal(&document()?)
}

/// Function called by [`show_login`] when a session exists.  Without one the
/// shell's `fetchSections()` is used.
#[wasm_bindgen(js_name = setSectionsLoader)]
pub fn set_sections_loader(loader: Option<Function>) {
    ui::login::set_sections_loader(loader);
}

/// Function called after a request found the session invalid.  Without one
/// the parent frame's `showLogin()` is used.
#[wasm_bindgen(js_name = setSessionInvalidHandler)]
pub fn set_session_invalid_handler(handler: Option<Function>) {
    ui::login::set_session_invalid_handler(handler);
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

#[wasm_bindgen(js_name = setCookie)]
pub fn set_cookie(name: &str, value: &str, minutes: f64) -> Result<(), JsValue> {
    let minutes = cookies::whole_minutes(minutes)
        .ok_or_else(|| JsValue::from_str("cookie lifetime must be a finite number of minutes"))?;
    DocumentCookies.set(name, value, minutes);
    Ok(())
}

#[wasm_bindgen(js_name = getCookie)]
pub fn get_cookie(name: &str) -> String {
    DocumentCookies.get(name)
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[wasm_bindgen(js_name = showAlert)]
pub fn show_alert(selector: &str, text: &str) -> Result<(), JsValue> {
    ui::alerts::show_alert(&document()?, selector, text)
}

#[wasm_bindgen(js_name = showSuccessAlert)]
pub fn show_success_alert(data: JsValue) {
    let data = optional_json(data).unwrap_or(Value::Null);
    DomAlerts.success(&ui::alerts::success_alert_text(&data));
}

#[wasm_bindgen(js_name = showErrorAlert)]
pub fn show_error_alert(data: JsValue) {
    let data = optional_json(data);
    DomAlerts.error(&ui::alerts::error_alert_text(data.as_ref()));
}
