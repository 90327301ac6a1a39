// DOM contract of the control-center pages
pub const CONTAINER_ID: &str = "container";
pub const ERROR_ALERT_SELECTOR: &str = "#error";
pub const SUCCESS_ALERT_SELECTOR: &str = "#success";
pub const LOGIN_MODAL_ID: &str = "loginModal";
pub const MODAL_BACKDROP_ID: &str = "loginModal-backdrop";

// Persistent browser storage keys
pub const ADDR_STORAGE_KEY: &str = "addr";
pub const TOKEN_COOKIE: &str = "token";
pub const SUB_COOKIE: &str = "sub";

// Request headers carrying the session credentials
pub const TOKEN_HEADER: &str = "token";
pub const SUB_HEADER: &str = "sub";

// Messages shown when the server gives us nothing better
pub const GENERAL_ERROR_MESSAGE: &str = "Errore generale";
pub const OFFLINE_MESSAGE: &str = "Il server non ha ritornato dati: potrebbe essere offline";

// Alert animation timeline (milliseconds)
pub const ALERT_FADE_MS: u32 = 3500;
pub const ALERT_SLIDE_MS: u32 = 500;

/// Cookie lifetime used after login when the server's `expire` field cannot
/// be parsed.
pub const DEFAULT_SESSION_MINUTES: i64 = 30;
