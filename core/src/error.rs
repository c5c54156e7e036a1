use thiserror::Error;

/// A gate was declared with a configuration it cannot run with.
///
/// Raised by [`AuthConfigBuilder::build`](crate::AuthConfigBuilder::build), so a
/// misconfigured gate never reaches its first evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No authenticated predicate was supplied.
    #[error("an authenticated predicate is required")]
    MissingAuthenticatedPredicate,
    /// Neither a fixed redirect path nor a selector was supplied.
    #[error("redirect path must be either a fixed path or a selector")]
    MissingRedirectPath,
    /// The fixed redirect path has no path part, e.g. `""` or `?next=1`.
    #[error("redirect path must not be empty")]
    EmptyRedirectPath,
    /// The fixed redirect path contains whitespace or control characters.
    #[error("redirect path `{0}` contains whitespace or control characters")]
    InvalidRedirectPath(String),
    /// The redirect query parameter name is empty or contains `=`, `&`, `?` or `#`.
    #[error("redirect query parameter name `{0}` is not usable in a query string")]
    InvalidQueryParam(String),
}

/// A redirect path selector produced a value that cannot be used as a path.
///
/// Selector output is only known at evaluation time. The error is handed back
/// to the host untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector resolved to a value with no path part.
    #[error("redirect path selector returned an empty path")]
    EmptyRedirectPath,
    /// The selector resolved to a path with whitespace or control characters.
    #[error("redirect path selector returned `{0}`, which contains whitespace or control characters")]
    InvalidRedirectPath(String),
}

pub(crate) fn is_malformed_path(path: &str) -> bool {
    path.chars().any(|c| c.is_whitespace() || c.is_control())
}
