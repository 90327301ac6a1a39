//! Cookie helpers.
//!
//! The string handling mirrors what the browser does with `document.cookie`:
//! writes are `name=value;expires=…;path=/`, reads scan the `;`-separated
//! list for a `name=` prefix.  Values are neither encoded nor decoded.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlDocument;

use crate::logging;

/// Anything able to store and return cookies by name.
pub trait CookieJar {
    /// Value of `name`, or an empty string when the cookie is missing.
    fn get(&self, name: &str) -> String;

    /// Store `name=value` for `minutes` minutes.  `minutes <= 0` expires the
    /// cookie immediately.
    fn set(&self, name: &str, value: &str, minutes: i64);
}

/// Last year an `expires` date can be written in the four-digit layout.
const LAST_EXPIRY_YEAR: i32 = 9999;

/// Whole minutes for a lifetime coming from JS.  `NaN` and infinities have
/// no meaning as a lifetime and give `None`.
pub fn whole_minutes(minutes: f64) -> Option<i64> {
    if !minutes.is_finite() {
        return None;
    }
    Some(minutes.round() as i64)
}

/// Expiry instant `minutes` after `now`.
///
/// `None` when the instant cannot be written as a cookie date: the cookie
/// then lives for the browser session.  Lifetimes too far in the past
/// clamp to the epoch, which still expires the cookie.
pub fn expiry_after(now: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    match Duration::try_minutes(minutes).and_then(|d| now.checked_add_signed(d)) {
        Some(at) if at.year() <= LAST_EXPIRY_YEAR => Some(at),
        Some(_) => None,
        None if minutes < 0 => Some(DateTime::<Utc>::UNIX_EPOCH),
        None => None,
    }
}

/// Build the assignment string written to `document.cookie`.  Without
/// `expires` the cookie is a session cookie.
///
/// The date uses the same layout as JS `Date.prototype.toUTCString()`.
pub fn format_cookie(name: &str, value: &str, expires: Option<DateTime<Utc>>) -> String {
    match expires {
        Some(at) => format!(
            "{}={};expires={};path=/",
            name,
            value,
            at.format("%a, %d %b %Y %H:%M:%S GMT")
        ),
        None => format!("{}={};path=/", name, value),
    }
}

/// Look `name` up in a `document.cookie` style string.
pub fn find_cookie<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    let prefix = format!("{}=", name);
    cookies
        .split(';')
        .map(|entry| entry.trim_start_matches(' '))
        .find_map(|entry| entry.strip_prefix(prefix.as_str()))
}

// ---------------------------------------------------------------------------
// Browser backend
// ---------------------------------------------------------------------------

/// Cookies of the current page (`document.cookie`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCookies;

impl DocumentCookies {
    fn document() -> Result<HtmlDocument, JsValue> {
        web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document on window"))?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| JsValue::from_str("document is not an HTML document"))
    }

    fn raw() -> Result<String, JsValue> {
        Self::document()?.cookie()
    }
}

impl CookieJar for DocumentCookies {
    fn get(&self, name: &str) -> String {
        match Self::raw() {
            Ok(all) => find_cookie(&all, name).unwrap_or_default().to_string(),
            Err(e) => {
                logging::warn(&format!("Cannot read cookie '{}': {:?}", name, e));
                String::new()
            }
        }
    }

    fn set(&self, name: &str, value: &str, minutes: i64) {
        let assignment = format_cookie(name, value, expiry_after(Utc::now(), minutes));
        if let Err(e) = Self::document().and_then(|d| d.set_cookie(&assignment)) {
            logging::warn(&format!("Cannot write cookie '{}': {:?}", name, e));
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Cookie store kept in memory.  Expiry is honoured on read, so a cookie set
/// with `minutes = 0` reads back as empty just like in a browser.  Entries
/// without an expiry are session cookies and never lapse.
#[derive(Debug, Default)]
pub struct MemoryCookies {
    entries: RefCell<HashMap<String, (String, Option<DateTime<Utc>>)>>,
}

impl MemoryCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live cookies rendered the way `document.cookie` returns them.
    pub fn cookie_string(&self) -> String {
        let now = Utc::now();
        let mut live: Vec<String> = self
            .entries
            .borrow()
            .iter()
            .filter(|(_, (_, expires))| expires.map_or(true, |at| at > now))
            .map(|(name, (value, _))| format!("{}={}", name, value))
            .collect();
        live.sort();
        live.join("; ")
    }
}

impl CookieJar for MemoryCookies {
    fn get(&self, name: &str) -> String {
        find_cookie(&self.cookie_string(), name)
            .unwrap_or_default()
            .to_string()
    }

    fn set(&self, name: &str, value: &str, minutes: i64) {
        let now = Utc::now();
        let expires = expiry_after(now, minutes);
        let mut entries = self.entries.borrow_mut();
        if expires.is_some_and(|at| at <= now) {
            entries.remove(name);
        } else {
            entries.insert(name.to_string(), (value.to_string(), expires));
        }
    }
}
