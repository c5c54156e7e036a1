//! Gate middleware for `http-kit` servers.
//!
//! ```rust
//! use gatehouse::{
//!     auth::ExtensionState,
//!     middleware::AuthGate,
//!     AuthConfig, Request,
//! };
//!
//! #[derive(Clone)]
//! struct Session {
//!     user: String,
//! }
//!
//! let config = AuthConfig::builder()
//!     .authenticated(|session: &Option<Session>, _: &Request| session.is_some())
//!     .redirect_path("/login")
//!     .build()
//!     .unwrap();
//!
//! let gate = AuthGate::new(ExtensionState::<Session>::new(), config);
//! # let _ = gate;
//! ```
mod auth;

pub use auth::{navigation_target, AuthGate, FailureView, GateError, PendingView};
pub use http_kit::middleware::Middleware;
