//! Where a gate reads authentication state from.
//!
//! The gate never owns authentication state. It takes a fresh snapshot per
//! request from an [`AuthStateSource`]:
//!
//! - [`ExtensionState`]: a value an upstream middleware stored in the request
//!   extensions (a session, decoded claims, ...).
//! - [`from_fn`]: any synchronous function of the request.
//!
//! # Example
//!
//! ```rust
//! use gatehouse::auth::{from_fn, ExtensionState};
//!
//! #[derive(Clone)]
//! struct Session {
//!     user: String,
//! }
//!
//! // Read the `Session` a session middleware inserted earlier.
//! let from_extensions = ExtensionState::<Session>::new();
//!
//! // Or inspect the request directly.
//! let from_cookie = from_fn(|request: &gatehouse::Request| {
//!     request.headers().contains_key("cookie")
//! });
//! # let _ = (from_extensions, from_cookie);
//! ```

mod source;

pub use source::{from_fn, AuthStateSource, ExtensionState, FnSource};
