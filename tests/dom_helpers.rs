//! Browser tests for the DOM-facing helpers.
//!
//! Run with: wasm-pack test --headless --firefox

#![cfg(target_arch = "wasm32")]

use butler_panel_frontend::constants::{ADDR_STORAGE_KEY, ALERT_FADE_MS, ALERT_SLIDE_MS, TOKEN_COOKIE};
use butler_panel_frontend::cookies::{CookieJar, DocumentCookies, MemoryCookies};
use butler_panel_frontend::page;
use butler_panel_frontend::session::Session;
use butler_panel_frontend::ui::{alerts, login};
use gloo_timers::future::TimeoutFuture;
use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlInputElement, HtmlTextAreaElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Append a fresh element with `id`, removing any leftover from other tests.
fn mount(document: &Document, tag: &str, id: &str) -> web_sys::Element {
    if let Some(old) = document.get_element_by_id(id) {
        old.remove();
    }
    let el = document.create_element(tag).unwrap();
    el.set_id(id);
    document.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test]
fn init_renders_starting_data() {
    let document = document();
    let container = mount(&document, "div", "container");

    page::init(&document, Some("<p id=\"first\">ciao</p>"));
    assert_eq!(container.inner_html(), "<p id=\"first\">ciao</p>");

    page::init(&document, None);
    assert_eq!(container.inner_html(), "<p id=\"first\">ciao</p>");
}

#[wasm_bindgen_test]
fn unload_copies_live_values_into_markup() {
    let document = document();
    let form = mount(&document, "form", "unload-form");
    form.set_inner_html("<input id=\"u-name\" value=\"old\"><textarea id=\"u-body\"></textarea>");

    let input: HtmlInputElement = document.get_element_by_id("u-name").unwrap().dyn_into().unwrap();
    let area: HtmlTextAreaElement = document.get_element_by_id("u-body").unwrap().dyn_into().unwrap();
    input.set_value("typed");
    area.set_value("long text");

    let synced = page::unload(&document).unwrap();
    assert!(synced >= 2);
    assert_eq!(input.get_attribute("value").as_deref(), Some("typed"));
    assert!(form.outer_html().contains("long text"));
}

#[wasm_bindgen_test]
fn alert_sets_text_and_shows_element() {
    let document = document();
    let banner = mount(&document, "div", "error");

    alerts::show_alert(&document, "#error", "bad token").unwrap();
    assert_eq!(banner.text_content().as_deref(), Some("bad token"));
    let style = banner.dyn_ref::<web_sys::HtmlElement>().unwrap().style();
    assert_eq!(style.get_property_value("display").unwrap(), "block");
}

#[wasm_bindgen_test]
async fn alert_leaves_no_bookkeeping_in_markup() {
    let document = document();
    let banner = mount(&document, "div", "success");
    banner.set_attribute("style", "display: none;").unwrap();

    alerts::show_alert(&document, "#success", "Notifica salvata").unwrap();
    assert!(banner.get_attribute("data-alert-seq").is_none());

    TimeoutFuture::new(ALERT_FADE_MS + ALERT_SLIDE_MS + 200).await;
    assert_eq!(banner.text_content().as_deref(), Some(""));
    assert_eq!(banner.get_attribute("style").as_deref(), Some("display: none;"));
}

#[wasm_bindgen_test]
fn alert_on_missing_element_is_ignored() {
    assert!(alerts::show_alert(&document(), "#does-not-exist", "x").is_ok());
}

#[wasm_bindgen_test]
fn login_modal_opens_without_session() {
    let document = document();
    let modal = mount(&document, "div", "loginModal");
    modal.set_class_name("modal");

    login::show_login(&document, &MemoryCookies::new()).unwrap();
    assert!(login::is_login_modal_open(&document));
    assert_eq!(modal.get_attribute("data-backdrop").as_deref(), Some("static"));
    assert_eq!(modal.get_attribute("data-keyboard").as_deref(), Some("false"));
    assert!(document.get_element_by_id("loginModal-backdrop").is_some());

    login::hide_login_modal(&document).unwrap();
    assert!(!login::is_login_modal_open(&document));
    assert!(document.get_element_by_id("loginModal-backdrop").is_none());
}

#[wasm_bindgen_test]
fn valid_session_loads_sections() {
    let document = document();
    let window = web_sys::window().unwrap();
    Reflect::set(&window, &"__sectionsLoaded".into(), &JsValue::from_f64(0.0)).unwrap();
    let loader = Function::new_no_args("window.__sectionsLoaded += 1;");
    login::set_sections_loader(Some(loader));

    let jar = MemoryCookies::new();
    Session::store(&jar, "tok", "admin", 5);
    login::show_login(&document, &jar).unwrap();

    let calls = Reflect::get(&window, &"__sectionsLoaded".into()).unwrap();
    assert_eq!(calls.as_f64(), Some(1.0));
    login::set_sections_loader(None);
}

#[wasm_bindgen_test]
fn document_cookies_round_trip() {
    let jar = DocumentCookies;
    jar.set("panel_test", "abc.def", 5);
    assert_eq!(jar.get("panel_test"), "abc.def");
    jar.set("panel_test", "", 0);
    assert_eq!(jar.get("panel_test"), "");
}

#[wasm_bindgen_test]
fn set_cookie_rejects_non_finite_lifetime() {
    assert!(butler_panel_frontend::set_cookie("panel_inf", "v", f64::INFINITY).is_err());
    assert!(butler_panel_frontend::set_cookie("panel_nan", "v", f64::NAN).is_err());
    assert_eq!(DocumentCookies.get("panel_inf"), "");

    butler_panel_frontend::set_cookie("panel_far", "v", 1e12).unwrap();
    assert_eq!(DocumentCookies.get("panel_far"), "v");
    DocumentCookies.set("panel_far", "", 0);
}

// ---------------------------------------------------------------------------
// Session-invalid notification
// ---------------------------------------------------------------------------

fn window() -> web_sys::Window {
    web_sys::window().unwrap()
}

fn reset_counter(name: &str) {
    Reflect::set(&window(), &name.into(), &JsValue::from_f64(0.0)).unwrap();
}

fn counter(name: &str) -> f64 {
    Reflect::get(&window(), &name.into()).unwrap().as_f64().unwrap()
}

fn install_window_show_login() {
    reset_counter("__showLoginCalls");
    let show_login = Function::new_no_args("window.__showLoginCalls += 1;");
    Reflect::set(&window(), &"showLogin".into(), &show_login).unwrap();
}

fn remove_window_show_login() {
    Reflect::delete_property(&window(), &"showLogin".into()).unwrap();
}

#[wasm_bindgen_test]
fn invalid_session_calls_frame_show_login() {
    login::set_session_invalid_handler(None);
    install_window_show_login();

    login::notify_session_invalid();
    assert_eq!(counter("__showLoginCalls"), 1.0);

    remove_window_show_login();
}

#[wasm_bindgen_test]
fn registered_handler_wins_over_frame_show_login() {
    install_window_show_login();
    reset_counter("__handlerCalls");
    login::set_session_invalid_handler(Some(Function::new_no_args("window.__handlerCalls += 1;")));

    login::notify_session_invalid();
    assert_eq!(counter("__handlerCalls"), 1.0);
    assert_eq!(counter("__showLoginCalls"), 0.0);

    login::set_session_invalid_handler(None);
    remove_window_show_login();
}

#[wasm_bindgen_test]
fn invalid_session_without_shell_opens_own_modal() {
    let document = document();
    login::set_session_invalid_handler(None);
    remove_window_show_login();
    DocumentCookies.set(TOKEN_COOKIE, "", 0);
    let modal = mount(&document, "div", "loginModal");
    modal.set_class_name("modal");

    login::notify_session_invalid();
    assert!(login::is_login_modal_open(&document));

    login::hide_login_modal(&document).unwrap();
}

// ---------------------------------------------------------------------------
// request() export
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
async fn unknown_method_reports_without_callback() {
    let document = document();
    let banner = mount(&document, "div", "error");
    reset_counter("__requestCallbacks");
    let callback = Function::new_no_args("window.__requestCallbacks += 1;");

    butler_panel_frontend::request("TRACE", "sections", JsValue::UNDEFINED, callback);
    assert_eq!(
        banner.text_content().as_deref(),
        Some("Unsupported HTTP method 'TRACE'")
    );

    TimeoutFuture::new(50).await;
    assert_eq!(counter("__requestCallbacks"), 0.0);
}

/// Replace `window.fetch` with one answering `status` and `body`, recording
/// the requested URL.  Returns the real `fetch` for [`restore_fetch`].
fn stub_fetch(status: u16, body: &str) -> JsValue {
    let real = Reflect::get(&window(), &"fetch".into()).unwrap();
    let stub = Function::new_with_args(
        "req",
        &format!(
            "window.__lastUrl = req.url; return Promise.resolve(new Response({:?}, {{status: {}}}));",
            body, status
        ),
    );
    Reflect::set(&window(), &"fetch".into(), &stub).unwrap();
    window()
        .local_storage()
        .unwrap()
        .unwrap()
        .set_item(ADDR_STORAGE_KEY, "http://panel.test")
        .unwrap();
    real
}

fn restore_fetch(real: JsValue) {
    Reflect::set(&window(), &"fetch".into(), &real).unwrap();
}

#[wasm_bindgen_test]
async fn successful_request_passes_decoded_data_to_callback() {
    let real = stub_fetch(200, r#"{"a":1}"#);
    let callback = Function::new_with_args("data", "window.__requestData = data;");

    butler_panel_frontend::request("GET", "sections", JsValue::UNDEFINED, callback);
    TimeoutFuture::new(50).await;
    restore_fetch(real);

    let data = Reflect::get(&window(), &"__requestData".into()).unwrap();
    let a = Reflect::get(&data, &"a".into()).unwrap();
    assert_eq!(a.as_f64(), Some(1.0));
    let url = Reflect::get(&window(), &"__lastUrl".into()).unwrap();
    assert_eq!(url.as_string().as_deref(), Some("http://panel.test/sections"));
}

#[wasm_bindgen_test]
async fn failed_request_shows_banner_and_skips_callback() {
    let document = document();
    let banner = mount(&document, "div", "error");
    reset_counter("__requestCallbacks");
    let callback = Function::new_no_args("window.__requestCallbacks += 1;");
    let real = stub_fetch(404, r#"{"message":"Sezione mancante"}"#);

    butler_panel_frontend::request("POST", "sections", JsValue::UNDEFINED, callback);
    TimeoutFuture::new(50).await;
    restore_fetch(real);

    assert_eq!(counter("__requestCallbacks"), 0.0);
    assert_eq!(banner.text_content().as_deref(), Some("Sezione mancante"));
}
