//! carelink HTTP client
//!
//! [`client::session::AuthenticatedRequestClient`] attaches the stored bearer
//! token to every request and renews it once on `401`. [`CareClient`] wraps
//! each backend endpoint in a typed method on top of it.

pub mod client;

pub use client::config::{ClientConfig, MissingTokenPolicy};
pub use client::error::{ClientError, SESSION_EXPIRED_MESSAGE};
pub use client::request::RequestOptions;
pub use client::session::{AuthenticatedRequestClient, LogSessionExpired, SessionExpiredHandler};
pub use client::{CareClient, CareClientBuilder};
