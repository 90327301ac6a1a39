//! Session credentials (`token` + `sub`) persisted as cookies.

use crate::constants::{SUB_COOKIE, TOKEN_COOKIE};
use crate::cookies::CookieJar;

/// Snapshot of the credentials sent with every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub sub: String,
}

impl Session {
    /// Read the current credentials from `jar`.
    pub fn read(jar: &dyn CookieJar) -> Self {
        Self {
            token: jar.get(TOKEN_COOKIE),
            sub: jar.get(SUB_COOKIE),
        }
    }

    /// An empty token means nobody is logged in.
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Persist a freshly issued token for `minutes` minutes.
    pub fn store(jar: &dyn CookieJar, token: &str, sub: &str, minutes: i64) {
        jar.set(TOKEN_COOKIE, token, minutes);
        jar.set(SUB_COOKIE, sub, minutes);
    }

    /// Drop the token.  `sub` is kept so the next login can prefill it.
    pub fn invalidate(jar: &dyn CookieJar) {
        jar.set(TOKEN_COOKIE, "", 0);
    }
}
