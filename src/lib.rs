#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

//! Authentication gates for `http-kit` servers.
//!
//! A gate sits in front of a protected endpoint. For every request it takes a
//! snapshot of the authentication state, evaluates its [`AuthConfig`] and then
//! either runs the endpoint, answers "try again" while authentication is still
//! in flight, or redirects to a fallback such as a login page, carrying the
//! original destination along:
//!
//! ```rust
//! use gatehouse::{auth::ExtensionState, middleware::AuthGate, AuthConfig, Request};
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
//! // GET /auth?test=foo without a session is answered with
//! // `302 Found`, `Location: /login?redirect=%2Fauth%3Ftest%3Dfoo`.
//! let gate = AuthGate::new(ExtensionState::<Session>::new(), config);
//! # let _ = gate;
//! ```
//!
//! The decision logic itself lives in [`gatehouse_core`] and is re-exported
//! here; it has no HTTP dependency and can drive client-side hosts through
//! [`ViewSelector`] and [`GuardedNavigator`].

pub mod auth;

pub mod middleware;
pub use middleware::{AuthGate, GateError};

pub mod responder;

/// Helpers for login handlers.
pub mod extract;

#[cfg(not(target_arch = "wasm32"))]
pub mod logging;

#[doc(inline)]
pub use gatehouse_core::{
    decide_nested, navigate, view, AuthConfig, AuthConfigBuilder, AuthDecisionPolicy,
    ConfigurationError, Decision, GuardedNavigator, NavigationGuard, NavigationTarget, Navigator,
    Predicate, RedirectBack, RedirectLocation, RedirectLocationBuilder, RedirectPath,
    SelectorError, Settings, View, ViewSelector, ViewState, DEFAULT_QUERY_PARAM,
};

#[doc(inline)]
pub use http_kit::{header, Body, Endpoint, Middleware, Request, Response, StatusCode, Uri};

/// A gate declaration evaluated against HTTP requests.
pub type GateConfig<S> = AuthConfig<S, Request>;
