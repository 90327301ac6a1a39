//! Request dispatcher used by every page of the control panel.
//!
//! A [`PanelClient`] owns everything a request needs: the API address, the
//! cookie jar holding the session, the banner presenter and the handler to
//! call when the server rejects the session.  Nothing is read from globals.

use std::rc::Rc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::config::PanelConfig;
use super::error::RequestError;
use super::request::{Method, OutgoingRequest};
use super::response;
use super::transport::{FetchTransport, Transport};
use crate::constants::DEFAULT_SESSION_MINUTES;
use crate::cookies::CookieJar;
use crate::logging;
use crate::session::Session;
use crate::ui::alerts::Feedback;

#[derive(Clone)]
pub struct PanelClient<T: Transport = FetchTransport> {
    config: PanelConfig,
    transport: T,
    cookies: Rc<dyn CookieJar>,
    feedback: Rc<dyn Feedback>,
    on_session_invalid: Rc<dyn Fn()>,
}

/// What `POST /authenticate` returns on success.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenOut {
    pub token: String,
    #[serde(default)]
    pub expire: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct AddrOut {
    addr: String,
}

impl<T: Transport> PanelClient<T> {
    pub fn new(
        config: PanelConfig,
        transport: T,
        cookies: Rc<dyn CookieJar>,
        feedback: Rc<dyn Feedback>,
    ) -> Self {
        Self {
            config,
            transport,
            cookies,
            feedback,
            on_session_invalid: Rc::new(|| {}),
        }
    }

    /// Register the handler run after the token has been dropped.
    pub fn on_session_invalid(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_session_invalid = Rc::new(handler);
        self
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn session(&self) -> Session {
        Session::read(self.cookies.as_ref())
    }

    /// Send `parameters` as JSON to `{addr}/{url}`.
    ///
    /// Failures are reported before returning: the error banner is shown and,
    /// when the session is no longer valid, the token is cleared and the
    /// session handler runs.
    pub async fn request<P>(&self, method: Method, url: &str, parameters: &P) -> Result<Value, RequestError>
    where
        P: Serialize + ?Sized,
    {
        let outcome = self.dispatch(method, url, parameters).await;
        if let Err(err) = &outcome {
            self.report(method, url, err);
        }
        outcome
    }

    async fn dispatch<P>(&self, method: Method, url: &str, parameters: &P) -> Result<Value, RequestError>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_string(parameters).map_err(|e| RequestError::InvalidRequest(e.to_string()))?;
        let request = OutgoingRequest::json(method, self.config.url(url), body).with_session(&self.session());
        let raw = self.transport.send(request).await?;
        response::into_result(raw)
    }

    fn report(&self, method: Method, url: &str, err: &RequestError) {
        logging::error(&format!("{} {} failed: {}", method, url, err));
        if err.invalidates_session() {
            logging::warn("Session rejected, asking for a new login");
            Session::invalidate(self.cookies.as_ref());
            (self.on_session_invalid)();
        }
        self.feedback.error(err.banner_message());
    }

    /// Log in against `POST /authenticate` and store the issued token.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<TokenOut, RequestError> {
        let payload = json!({ "username": username, "password": password });
        let value = self.request(Method::Post, "authenticate", &payload).await?;
        let token_out: TokenOut = serde_json::from_value(value)
            .map_err(|e| RequestError::Transport(format!("unexpected login response: {}", e)))?;

        let minutes = token_out
            .expire
            .as_deref()
            .and_then(|expire| minutes_until(expire, Utc::now()))
            .unwrap_or(DEFAULT_SESSION_MINUTES);
        Session::store(self.cookies.as_ref(), &token_out.token, username, minutes);
        logging::log(&format!("Logged in as '{}' for {} minutes", username, minutes));

        if let Some(message) = &token_out.message {
            self.feedback.success(message);
        }
        Ok(token_out)
    }
}

/// Ask the GUI server at `gui_origin` where the control API is (`GET /api`).
pub async fn discover_addr<T: Transport>(transport: &T, gui_origin: &str) -> Result<PanelConfig, RequestError> {
    let gui = PanelConfig::from_url(gui_origin);
    let raw = transport
        .send(OutgoingRequest::json(Method::Get, gui.url("api"), String::new()))
        .await?;
    let value = response::into_result(raw)?;
    let out: AddrOut = serde_json::from_value(value)
        .map_err(|e| RequestError::Transport(format!("unexpected /api response: {}", e)))?;
    Ok(PanelConfig::from_url(&out.addr))
}

/// Whole minutes left until the server-side expiry `expire`, written as a
/// Python `datetime` in UTC (`2021-03-09 07:05:00.123456`).
pub fn minutes_until(expire: &str, now: DateTime<Utc>) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(expire.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()?;
    let seconds = (naive.and_utc() - now).num_seconds();
    Some(((seconds + 59) / 60).max(1))
}
