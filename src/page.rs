//! Page lifecycle helpers: initial content on load, form snapshot on unload.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlInputElement, HtmlTextAreaElement};

use crate::constants::CONTAINER_ID;

/// Render the pre-built HTML of the page into `#container`.
///
/// The markup is inserted as is.  Nothing happens when there is no payload
/// or no container.
pub fn init(document: &Document, starting_data: Option<&str>) {
    let Some(html) = starting_data else {
        return;
    };
    if let Some(container) = document.get_element_by_id(CONTAINER_ID) {
        container.set_inner_html(html);
    }
}

/// Copy the live value of every `<input>` and `<textarea>` into its markup so
/// a snapshot of the page HTML keeps what the user typed.
///
/// Checkbox `checked` state is not carried over.
pub fn unload(document: &Document) -> Result<usize, JsValue> {
    let mut synced = 0;

    let inputs = document.query_selector_all("input")?;
    for i in 0..inputs.length() {
        if let Some(input) = inputs.item(i).and_then(|n| n.dyn_into::<HtmlInputElement>().ok()) {
            input.set_default_value(&input.value());
            synced += 1;
        }
    }

    let areas = document.query_selector_all("textarea")?;
    for i in 0..areas.length() {
        if let Some(area) = areas.item(i).and_then(|n| n.dyn_into::<HtmlTextAreaElement>().ok()) {
            area.set_default_value(&area.value());
            synced += 1;
        }
    }

    Ok(synced)
}
