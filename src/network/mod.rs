pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{discover_addr, PanelClient, TokenOut};
pub use config::PanelConfig;
pub use error::{ErrorBody, RequestError};
pub use request::{Method, OutgoingRequest, RawResponse};
pub use transport::{FetchTransport, Transport};
