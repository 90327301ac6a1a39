pub mod alerts;
pub mod login;

pub use alerts::{DomAlerts, Feedback};
