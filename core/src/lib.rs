#![deny(unsafe_code)]
//! Decision logic behind Gatehouse's authentication gates.
//!
//! A gate is declared once with an [`AuthConfig`] and evaluated on every state
//! change by its host. Evaluation is a pure function of the authentication
//! state, the host's props and the current [`NavigationTarget`]:
//!
//! ```
//! use gatehouse_core::{AuthConfig, AuthDecisionPolicy, Decision, NavigationTarget};
//!
//! struct Session {
//!     user: Option<String>,
//! }
//!
//! let config = AuthConfig::<Session, ()>::builder()
//!     .authenticated(|session, _| session.user.is_some())
//!     .redirect_path("/login")
//!     .build()
//!     .unwrap();
//! let policy = AuthDecisionPolicy::new(config);
//!
//! let target = NavigationTarget::parse("/auth?test=foo");
//! let decision = policy
//!     .decide(&Session { user: None }, &(), Some(&target))
//!     .unwrap();
//!
//! match decision {
//!     Decision::Redirect(location) => {
//!         assert_eq!(location.pathname, "/login");
//!         assert_eq!(location.search, "?redirect=%2Fauth%3Ftest%3Dfoo");
//!     }
//!     _ => unreachable!(),
//! }
//! ```

mod config;
pub use config::{
    AuthConfig, AuthConfigBuilder, Predicate, RedirectBack, RedirectPath, Settings,
    DEFAULT_QUERY_PARAM,
};

mod error;
pub use error::{ConfigurationError, SelectorError};

mod location;
pub use location::{NavigationTarget, RedirectLocation, RedirectLocationBuilder};

mod policy;
pub use policy::{decide_nested, AuthDecisionPolicy, Decision};

pub mod navigate;
pub use navigate::{GuardedNavigator, NavigationGuard, Navigator};

pub mod view;
pub use view::{View, ViewSelector, ViewState};
