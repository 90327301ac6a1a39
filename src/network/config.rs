use wasm_bindgen::JsValue;

use crate::constants::ADDR_STORAGE_KEY;

/// Where the control API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    base_url: String,
}

impl Default for PanelConfig {
    /// Points at a local control API.  Only meant for tests and for pages
    /// opened before the `addr` key was ever written.
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
        }
    }
}

impl PanelConfig {
    /// Create a config from the `PANEL_API_ADDR` build-time variable.
    pub fn new() -> Result<Self, &'static str> {
        if let Some(url) = option_env!("PANEL_API_ADDR") {
            Ok(Self::from_url(url))
        } else {
            Err("PANEL_API_ADDR environment variable is not set")
        }
    }

    /// Create a config from a URL string
    pub fn from_url(url: &str) -> Self {
        Self { base_url: url.trim_end_matches('/').to_string() }
    }

    /// Read the address stored under `addr` in localStorage, falling back to
    /// the build-time address and finally to [`PanelConfig::default`].
    pub fn from_local_storage() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
        let stored = match window.local_storage()? {
            Some(storage) => storage.get_item(ADDR_STORAGE_KEY)?,
            None => None,
        };

        Ok(match stored {
            Some(addr) if !addr.trim().is_empty() => Self::from_url(addr.trim()),
            _ => Self::new().unwrap_or_default(),
        })
    }

    /// Persist this address under `addr` so later pages pick it up.
    pub fn store(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window exists"))?;
        let storage = window
            .local_storage()?
            .ok_or_else(|| JsValue::from_str("localStorage unavailable"))?;
        storage.set_item(ADDR_STORAGE_KEY, &self.base_url)
    }

    /// Get the base URL for all API calls
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `path`, i.e. `{addr}/{path}`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
