//! Login gate.
//!
//! Pages run inside a frame of the control-center shell.  When the session
//! is missing the `#loginModal` dialog is shown and cannot be dismissed until
//! the login completes; otherwise the shell's sections are (re)loaded.

use std::cell::RefCell;

use js_sys::{Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement, KeyboardEvent};

use crate::constants::{LOGIN_MODAL_ID, MODAL_BACKDROP_ID};
use crate::cookies::{CookieJar, DocumentCookies};
use crate::logging;
use crate::session::Session;

thread_local! {
    static SECTIONS_LOADER: RefCell<Option<Function>> = RefCell::new(None);
    static SESSION_INVALID_HANDLER: RefCell<Option<Function>> = RefCell::new(None);
    static ESCAPE_GUARD: RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>> = RefCell::new(None);
}

/// Replace the function used to load the application sections once a valid
/// session exists.  `None` restores the `fetchSections()` lookup.
pub fn set_sections_loader(loader: Option<Function>) {
    SECTIONS_LOADER.with(|cell| *cell.borrow_mut() = loader);
}

/// Replace the function run when a request finds the session invalid.
/// `None` restores the parent frame's `showLogin()`.
pub fn set_session_invalid_handler(handler: Option<Function>) {
    SESSION_INVALID_HANDLER.with(|cell| *cell.borrow_mut() = handler);
}

/// Show the login dialog when there is no token, load the sections otherwise.
pub fn show_login(document: &Document, cookies: &dyn CookieJar) -> Result<(), JsValue> {
    if Session::read(cookies).is_authenticated() {
        load_sections()
    } else {
        open_login_modal(document)
    }
}

pub fn load_sections() -> Result<(), JsValue> {
    if let Some(loader) = SECTIONS_LOADER.with(|cell| cell.borrow().clone()) {
        loader.call0(&JsValue::NULL)?;
        return Ok(());
    }
    if !call_frame_function("fetchSections")? {
        logging::warn("No fetchSections() available to load the sections");
    }
    Ok(())
}

/// Ask the hosting shell for a new login.  Falls back to this page's own
/// dialog when no shell exposes `showLogin()`.
pub fn notify_session_invalid() {
    let outcome = match SESSION_INVALID_HANDLER.with(|cell| cell.borrow().clone()) {
        Some(handler) => handler.call0(&JsValue::NULL).map(|_| true),
        None => call_frame_function("showLogin"),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                if let Err(e) = show_login(&document, &DocumentCookies) {
                    logging::error(&format!("Cannot show login: {:?}", e));
                }
            }
        }
        Err(e) => logging::error(&format!("showLogin() failed: {:?}", e)),
    }
}

/// Call `name()` on the parent frame, or on this window for a top-level page.
/// Returns `false` when neither defines it.
fn call_frame_function(name: &str) -> Result<bool, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
    let mut targets: Vec<JsValue> = Vec::with_capacity(2);
    if let Some(parent) = window.parent()? {
        targets.push(parent.into());
    }
    targets.push(window.into());

    for target in targets {
        let candidate = Reflect::get(&target, &JsValue::from_str(name))?;
        if let Some(func) = candidate.dyn_ref::<Function>() {
            func.call0(&target)?;
            return Ok(true);
        }
    }
    Ok(false)
}

// ---------------------------------------------------------------------------
// Modal handling (bootstrap markup, static backdrop, no keyboard dismissal)
// ---------------------------------------------------------------------------

pub fn open_login_modal(document: &Document) -> Result<(), JsValue> {
    let Some(modal) = document.get_element_by_id(LOGIN_MODAL_ID) else {
        logging::warn("#loginModal not found");
        return Ok(());
    };

    for (name, value) in [
        ("data-backdrop", "static"),
        ("data-bs-backdrop", "static"),
        ("data-keyboard", "false"),
        ("data-bs-keyboard", "false"),
        ("aria-modal", "true"),
        ("role", "dialog"),
    ] {
        modal.set_attribute(name, value)?;
    }
    modal.remove_attribute("aria-hidden")?;
    modal.class_list().add_1("show")?;
    if let Some(el) = modal.dyn_ref::<HtmlElement>() {
        el.style().set_property("display", "block")?;
    }

    if document.get_element_by_id(MODAL_BACKDROP_ID).is_none() {
        let backdrop = document.create_element("div")?;
        backdrop.set_id(MODAL_BACKDROP_ID);
        backdrop.set_class_name("modal-backdrop fade show");
        if let Some(body) = document.body() {
            body.append_child(&backdrop)?;
        }
    }
    if let Some(body) = document.body() {
        body.class_list().add_1("modal-open")?;
    }

    install_escape_guard(document)
}

pub fn hide_login_modal(document: &Document) -> Result<(), JsValue> {
    if let Some(modal) = document.get_element_by_id(LOGIN_MODAL_ID) {
        modal.class_list().remove_1("show")?;
        modal.set_attribute("aria-hidden", "true")?;
        modal.remove_attribute("aria-modal")?;
        if let Some(el) = modal.dyn_ref::<HtmlElement>() {
            el.style().set_property("display", "none")?;
        }
    }
    if let Some(backdrop) = document.get_element_by_id(MODAL_BACKDROP_ID) {
        backdrop.remove();
    }
    if let Some(body) = document.body() {
        body.class_list().remove_1("modal-open")?;
    }
    Ok(())
}

pub fn is_login_modal_open(document: &Document) -> bool {
    document
        .get_element_by_id(LOGIN_MODAL_ID)
        .map(|modal| modal.class_list().contains("show"))
        .unwrap_or(false)
}

/// Swallow Escape while the dialog is open.  Registered once per page, in the
/// capture phase so it runs before any bootstrap handler.
fn install_escape_guard(document: &Document) -> Result<(), JsValue> {
    ESCAPE_GUARD.with(|cell| {
        if cell.borrow().is_some() {
            return Ok(());
        }
        let guard = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            if event.key() != "Escape" {
                return;
            }
            let open = web_sys::window()
                .and_then(|w| w.document())
                .map(|d| is_login_modal_open(&d))
                .unwrap_or(false);
            if open {
                event.prevent_default();
                event.stop_immediate_propagation();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        document.add_event_listener_with_callback_and_bool(
            "keydown",
            guard.as_ref().unchecked_ref(),
            true,
        )?;
        *cell.borrow_mut() = Some(guard);
        Ok(())
    })
}
