use std::{fmt, sync::Arc};

use serde::Deserialize;

use crate::{
    error::{is_malformed_path, ConfigurationError},
    location::path_part,
};

/// Query parameter carrying the redirect-back target unless configured otherwise.
pub const DEFAULT_QUERY_PARAM: &str = "redirect";

/// A predicate over the authentication state and the host's props.
pub type Predicate<S, P> = Arc<dyn Fn(&S, &P) -> bool + Send + Sync>;

type PathSelector<S, P> = Arc<dyn Fn(&S, &P) -> String + Send + Sync>;
type BackPredicate<P> = Arc<dyn Fn(&P, &str) -> bool + Send + Sync>;

/// Where a denied visitor is sent.
pub enum RedirectPath<S, P> {
    /// The same path for every evaluation.
    Fixed(String),
    /// A path computed from the state and props at evaluation time.
    Selector(PathSelector<S, P>),
}

impl<S, P> RedirectPath<S, P> {
    /// Wrap a selector function.
    pub fn selector<F>(f: F) -> Self
    where
        F: Fn(&S, &P) -> String + Send + Sync + 'static,
    {
        Self::Selector(Arc::new(f))
    }

    pub(crate) fn resolve(&self, state: &S, props: &P) -> String {
        match self {
            Self::Fixed(path) => path.clone(),
            Self::Selector(select) => select(state, props),
        }
    }
}

impl<S, P> Clone for RedirectPath<S, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(path) => Self::Fixed(path.clone()),
            Self::Selector(select) => Self::Selector(Arc::clone(select)),
        }
    }
}

impl<S, P> fmt::Debug for RedirectPath<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(path) => f.debug_tuple("Fixed").field(path).finish(),
            Self::Selector(_) => f.write_str("Selector(..)"),
        }
    }
}

impl<S, P> From<&str> for RedirectPath<S, P> {
    fn from(path: &str) -> Self {
        Self::Fixed(path.to_owned())
    }
}

impl<S, P> From<String> for RedirectPath<S, P> {
    fn from(path: String) -> Self {
        Self::Fixed(path)
    }
}

/// Whether the original target is carried along as a redirect-back parameter.
pub enum RedirectBack<P> {
    /// Decided once at declaration.
    Flag(bool),
    /// Decided per evaluation from the props and the current pathname.
    Predicate(BackPredicate<P>),
}

impl<P> RedirectBack<P> {
    /// Wrap a predicate function.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&P, &str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    pub(crate) fn allows(&self, props: &P, pathname: &str) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Predicate(allow) => allow(props, pathname),
        }
    }
}

impl<P> Clone for RedirectBack<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Flag(flag) => Self::Flag(*flag),
            Self::Predicate(allow) => Self::Predicate(Arc::clone(allow)),
        }
    }
}

impl<P> fmt::Debug for RedirectBack<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<P> Default for RedirectBack<P> {
    fn default() -> Self {
        Self::Flag(true)
    }
}

impl<P> From<bool> for RedirectBack<P> {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// The static half of a gate declaration, loadable with serde.
///
/// ```
/// # use gatehouse_core::Settings;
/// let settings: Settings = serde_json::from_str(r#"{ "redirect_path": "/login" }"#).unwrap();
/// assert!(settings.allow_redirect_back);
/// assert_eq!(settings.query_param, "redirect");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Fixed path denied visitors are sent to.
    pub redirect_path: String,
    /// Carry the original target along.
    #[serde(default = "default_allow_redirect_back")]
    pub allow_redirect_back: bool,
    /// Name of the redirect-back query parameter.
    #[serde(default = "default_query_param")]
    pub query_param: String,
}

const fn default_allow_redirect_back() -> bool {
    true
}

fn default_query_param() -> String {
    DEFAULT_QUERY_PARAM.to_owned()
}

/// An immutable gate declaration.
///
/// Built once through [`AuthConfig::builder`]; every invariant on the redirect
/// path and the query parameter is checked there.
pub struct AuthConfig<S, P> {
    pub(crate) authenticated: Predicate<S, P>,
    pub(crate) authenticating: Predicate<S, P>,
    pub(crate) redirect_path: RedirectPath<S, P>,
    pub(crate) allow_redirect_back: RedirectBack<P>,
    pub(crate) query_param: String,
}

impl<S, P> AuthConfig<S, P> {
    /// Start declaring a gate.
    #[must_use]
    pub fn builder() -> AuthConfigBuilder<S, P> {
        AuthConfigBuilder::default()
    }

    /// Name of the redirect-back query parameter.
    #[must_use]
    pub fn query_param(&self) -> &str {
        &self.query_param
    }

    /// Evaluate the authenticated predicate.
    pub fn is_authenticated(&self, state: &S, props: &P) -> bool {
        (self.authenticated)(state, props)
    }

    /// Evaluate the authenticating predicate.
    pub fn is_authenticating(&self, state: &S, props: &P) -> bool {
        (self.authenticating)(state, props)
    }
}

impl<S, P> Clone for AuthConfig<S, P> {
    fn clone(&self) -> Self {
        Self {
            authenticated: Arc::clone(&self.authenticated),
            authenticating: Arc::clone(&self.authenticating),
            redirect_path: self.redirect_path.clone(),
            allow_redirect_back: self.allow_redirect_back.clone(),
            query_param: self.query_param.clone(),
        }
    }
}

impl<S, P> fmt::Debug for AuthConfig<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("redirect_path", &self.redirect_path)
            .field("allow_redirect_back", &self.allow_redirect_back)
            .field("query_param", &self.query_param)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AuthConfig`].
pub struct AuthConfigBuilder<S, P> {
    authenticated: Option<Predicate<S, P>>,
    authenticating: Option<Predicate<S, P>>,
    redirect_path: Option<RedirectPath<S, P>>,
    allow_redirect_back: RedirectBack<P>,
    query_param: String,
}

impl<S, P> Default for AuthConfigBuilder<S, P> {
    fn default() -> Self {
        Self {
            authenticated: None,
            authenticating: None,
            redirect_path: None,
            allow_redirect_back: RedirectBack::default(),
            query_param: DEFAULT_QUERY_PARAM.to_owned(),
        }
    }
}

impl<S, P> fmt::Debug for AuthConfigBuilder<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfigBuilder")
            .field("authenticated", &self.authenticated.is_some())
            .field("authenticating", &self.authenticating.is_some())
            .field("redirect_path", &self.redirect_path)
            .field("allow_redirect_back", &self.allow_redirect_back)
            .field("query_param", &self.query_param)
            .finish()
    }
}

impl<S, P> AuthConfigBuilder<S, P> {
    /// Predicate deciding whether the subject may see the protected view.
    #[must_use]
    pub fn authenticated<F>(mut self, f: F) -> Self
    where
        F: Fn(&S, &P) -> bool + Send + Sync + 'static,
    {
        let predicate: Predicate<S, P> = Arc::new(f);
        self.authenticated = Some(predicate);
        self
    }

    /// Predicate signalling an authentication check still in flight.
    #[must_use]
    pub fn authenticating<F>(mut self, f: F) -> Self
    where
        F: Fn(&S, &P) -> bool + Send + Sync + 'static,
    {
        let predicate: Predicate<S, P> = Arc::new(f);
        self.authenticating = Some(predicate);
        self
    }

    /// Fixed path or selector to send denied visitors to.
    #[must_use]
    pub fn redirect_path(mut self, path: impl Into<RedirectPath<S, P>>) -> Self {
        self.redirect_path = Some(path.into());
        self
    }

    /// Compute the redirect path at evaluation time.
    #[must_use]
    pub fn redirect_path_fn<F>(self, f: F) -> Self
    where
        F: Fn(&S, &P) -> String + Send + Sync + 'static,
    {
        self.redirect_path(RedirectPath::selector(f))
    }

    /// Carry the original target along, or not.
    #[must_use]
    pub fn allow_redirect_back(mut self, allow: impl Into<RedirectBack<P>>) -> Self {
        self.allow_redirect_back = allow.into();
        self
    }

    /// Decide per evaluation whether to carry the original target along.
    ///
    /// The second argument is the pathname of the current target.
    #[must_use]
    pub fn allow_redirect_back_fn<F>(self, f: F) -> Self
    where
        F: Fn(&P, &str) -> bool + Send + Sync + 'static,
    {
        self.allow_redirect_back(RedirectBack::predicate(f))
    }

    /// Name of the redirect-back query parameter.
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = name.into();
        self
    }

    /// Apply loaded [`Settings`].
    #[must_use]
    pub fn settings(self, settings: Settings) -> Self {
        self.redirect_path(settings.redirect_path)
            .allow_redirect_back(settings.allow_redirect_back)
            .query_param(settings.query_param)
    }

    /// Validate and freeze the declaration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the authenticated predicate or the
    /// redirect path is missing, when a fixed redirect path is empty or
    /// malformed, or when the query parameter name is unusable.
    pub fn build(self) -> Result<AuthConfig<S, P>, ConfigurationError>
    where
        S: 'static,
        P: 'static,
    {
        let authenticated = self
            .authenticated
            .ok_or(ConfigurationError::MissingAuthenticatedPredicate)?;
        let redirect_path = self
            .redirect_path
            .ok_or(ConfigurationError::MissingRedirectPath)?;

        if let RedirectPath::Fixed(path) = &redirect_path {
            if path_part(path).is_empty() {
                return Err(ConfigurationError::EmptyRedirectPath);
            }
            if is_malformed_path(path) {
                return Err(ConfigurationError::InvalidRedirectPath(path.clone()));
            }
        }

        if self.query_param.is_empty()
            || self.query_param.contains(['=', '&', '?', '#'])
        {
            return Err(ConfigurationError::InvalidQueryParam(self.query_param));
        }

        let authenticating = match self.authenticating {
            Some(predicate) => predicate,
            None => {
                let never: Predicate<S, P> = Arc::new(|_: &S, _: &P| false);
                never
            }
        };

        Ok(AuthConfig {
            authenticated,
            authenticating,
            redirect_path,
            allow_redirect_back: self.allow_redirect_back,
            query_param: self.query_param,
        })
    }
}
