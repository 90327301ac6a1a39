//! Transient success / error banners (`#success`, `#error`).
//!
//! A banner fades in, stays for [`ALERT_FADE_MS`], slides up over
//! [`ALERT_SLIDE_MS`] and finally loses its text.  Showing a new message on
//! the same element restarts the timeline; timers of the previous message
//! become no-ops.  Once the timeline ends the element gets back the inline
//! style it had before the first message.

use std::cell::RefCell;
use std::collections::HashMap;

use gloo_timers::callback::Timeout;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::constants::{
    ALERT_FADE_MS, ALERT_SLIDE_MS, ERROR_ALERT_SELECTOR, OFFLINE_MESSAGE, SUCCESS_ALERT_SELECTOR,
};
use crate::logging;

/// Running banner timeline of one selector.
struct Timeline {
    seq: u32,
    saved_style: Option<String>,
}

thread_local! {
    static TIMELINES: RefCell<HashMap<String, Timeline>> = RefCell::new(HashMap::new());
}

/// Where request outcomes are reported to the user.
pub trait Feedback {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Banners of the current page.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomAlerts;

impl Feedback for DomAlerts {
    fn success(&self, message: &str) {
        show_in_page(SUCCESS_ALERT_SELECTOR, message);
    }

    fn error(&self, message: &str) {
        show_in_page(ERROR_ALERT_SELECTOR, message);
    }
}

fn show_in_page(selector: &str, text: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Err(e) = show_alert(&document, selector, text) {
        logging::warn(&format!("Cannot show alert {}: {:?}", selector, e));
    }
}

/// Text of a success banner: `data.message`.
pub fn success_alert_text(data: &Value) -> String {
    message_of(data)
}

/// Text of an error banner; a missing `data` means the server sent nothing.
pub fn error_alert_text(data: Option<&Value>) -> String {
    match data {
        None | Some(Value::Null) => OFFLINE_MESSAGE.to_string(),
        Some(data) => message_of(data),
    }
}

fn message_of(data: &Value) -> String {
    match data.get("message") {
        Some(Value::String(message)) => message.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Put `text` into the element matching `selector` and run the banner
/// timeline.  A selector matching nothing is ignored.
pub fn show_alert(document: &Document, selector: &str, text: &str) -> Result<(), JsValue> {
    let Some(el) = document.query_selector(selector)? else {
        return Ok(());
    };
    let el: HtmlElement = el
        .dyn_into()
        .map_err(|_| JsValue::from_str("alert target is not an HTML element"))?;

    let seq = begin_timeline(selector, el.get_attribute("style"));
    el.set_text_content(Some(text));
    fade_in(&el)?;

    let fading = el.clone();
    let key = selector.to_string();
    Timeout::new(ALERT_FADE_MS, move || {
        if !is_current(&key, seq) {
            return;
        }
        if let Err(e) = slide_up(&fading) {
            logging::warn(&format!("Alert slide failed: {:?}", e));
        }

        let sliding = fading.clone();
        Timeout::new(ALERT_SLIDE_MS, move || {
            let Some(saved_style) = finish_timeline(&key, seq) else {
                return;
            };
            if let Err(e) = restore_style(&sliding, saved_style.as_deref()) {
                logging::warn(&format!("Alert reset failed: {:?}", e));
            }
            sliding.set_text_content(Some(""));
        })
        .forget();
    })
    .forget();

    Ok(())
}

/// Start (or restart) the timeline of `selector`.  `style` is the element's
/// inline style, kept only when no timeline was running.
fn begin_timeline(selector: &str, style: Option<String>) -> u32 {
    TIMELINES.with(|cell| {
        let mut timelines = cell.borrow_mut();
        let timeline = timelines.entry(selector.to_string()).or_insert(Timeline {
            seq: 0,
            saved_style: style,
        });
        timeline.seq = timeline.seq.wrapping_add(1);
        timeline.seq
    })
}

fn is_current(selector: &str, seq: u32) -> bool {
    TIMELINES.with(|cell| {
        cell.borrow()
            .get(selector)
            .map(|timeline| timeline.seq == seq)
            .unwrap_or(false)
    })
}

/// End the timeline when `seq` is still the latest message, returning the
/// inline style to put back.
fn finish_timeline(selector: &str, seq: u32) -> Option<Option<String>> {
    if !is_current(selector, seq) {
        return None;
    }
    TIMELINES.with(|cell| cell.borrow_mut().remove(selector).map(|t| t.saved_style))
}

fn fade_in(el: &HtmlElement) -> Result<(), JsValue> {
    let style = el.style();
    reset_geometry(el)?;
    style.set_property("transition", "none")?;
    style.set_property("opacity", "0")?;
    style.set_property("display", "block")?;
    // Force a reflow so the transition starts from opacity 0.
    let _ = el.offset_height();
    style.set_property("transition", &format!("opacity {}ms linear", ALERT_FADE_MS))?;
    style.set_property("opacity", "1")
}

fn slide_up(el: &HtmlElement) -> Result<(), JsValue> {
    let style = el.style();
    style.set_property("height", &format!("{}px", el.offset_height()))?;
    style.set_property("overflow", "hidden")?;
    let _ = el.offset_height();
    style.set_property(
        "transition",
        &format!(
            "height {ms}ms ease, padding {ms}ms ease, margin {ms}ms ease",
            ms = ALERT_SLIDE_MS
        ),
    )?;
    style.set_property("height", "0px")?;
    style.set_property("padding-top", "0px")?;
    style.set_property("padding-bottom", "0px")?;
    style.set_property("margin-top", "0px")?;
    style.set_property("margin-bottom", "0px")
}

fn restore_style(el: &HtmlElement, saved: Option<&str>) -> Result<(), JsValue> {
    match saved {
        Some(style) => el.set_attribute("style", style),
        None => el.remove_attribute("style"),
    }
}

fn reset_geometry(el: &HtmlElement) -> Result<(), JsValue> {
    let style = el.style();
    for prop in [
        "height",
        "overflow",
        "padding-top",
        "padding-bottom",
        "margin-top",
        "margin-bottom",
    ] {
        style.remove_property(prop)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_data_is_offline_message() {
        assert_eq!(error_alert_text(None), OFFLINE_MESSAGE);
        assert_eq!(error_alert_text(Some(&Value::Null)), OFFLINE_MESSAGE);
    }

    #[test]
    fn message_is_extracted() {
        assert_eq!(error_alert_text(Some(&json!({"message": "X"}))), "X");
        assert_eq!(success_alert_text(&json!({"message": "Notifica salvata"})), "Notifica salvata");
    }

    #[test]
    fn newer_message_supersedes_older_timers() {
        let first = begin_timeline("#t-restart", Some("display: none;".into()));
        let second = begin_timeline("#t-restart", Some("opacity: 1; display: block;".into()));
        assert!(!is_current("#t-restart", first));
        assert!(is_current("#t-restart", second));

        assert_eq!(finish_timeline("#t-restart", first), None);
        assert_eq!(
            finish_timeline("#t-restart", second),
            Some(Some("display: none;".to_string()))
        );
        assert!(!is_current("#t-restart", second));
    }

    #[test]
    fn timelines_are_tracked_per_selector() {
        let error = begin_timeline("#t-error", None);
        let success = begin_timeline("#t-success", None);
        assert!(is_current("#t-error", error));
        assert!(is_current("#t-success", success));
        assert_eq!(finish_timeline("#t-error", error), Some(None));
        assert!(is_current("#t-success", success));
    }

    #[test]
    fn data_without_message_renders_empty() {
        assert_eq!(error_alert_text(Some(&json!({"error": "boom"}))), "");
        assert_eq!(success_alert_text(&json!({"message": 3})), "3");
    }
}
