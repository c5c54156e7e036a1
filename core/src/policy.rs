use std::fmt;

use tracing::{debug, warn};

use crate::{
    config::AuthConfig,
    error::{is_malformed_path, SelectorError},
    location::{path_part, NavigationTarget, RedirectLocation, RedirectLocationBuilder},
};

/// Outcome of evaluating a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Render the protected view.
    Allow,
    /// Authentication is still being established; render nothing or a loader.
    Pending,
    /// Access denied; send the visitor to the location.
    Redirect(RedirectLocation),
}

impl Decision {
    /// Returns `true` for [`Decision::Allow`].
    #[must_use]
    pub const fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides between rendering a protected view and redirecting away from it.
///
/// Holds nothing but its declaration; every call to [`decide`](Self::decide)
/// is a pure function of its arguments and may be repeated freely.
pub struct AuthDecisionPolicy<S, P> {
    config: AuthConfig<S, P>,
    locations: RedirectLocationBuilder,
}

impl<S, P> fmt::Debug for AuthDecisionPolicy<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthDecisionPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S, P> Clone for AuthDecisionPolicy<S, P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            locations: self.locations.clone(),
        }
    }
}

impl<S, P> AuthDecisionPolicy<S, P> {
    /// Wrap a validated declaration.
    #[must_use]
    pub fn new(config: AuthConfig<S, P>) -> Self {
        let locations = RedirectLocationBuilder::new(config.query_param());
        Self { config, locations }
    }

    /// The declaration this policy evaluates.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig<S, P> {
        &self.config
    }

    /// The builder producing this policy's redirect locations.
    #[must_use]
    pub const fn locations(&self) -> &RedirectLocationBuilder {
        &self.locations
    }

    /// Evaluate the gate.
    ///
    /// The authenticating predicate is consulted first and suspends the
    /// decision. Otherwise an authenticated subject is allowed and anyone else
    /// is redirected.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when the redirect path selector resolves to an
    /// unusable path.
    pub fn decide(
        &self,
        state: &S,
        props: &P,
        target: Option<&NavigationTarget>,
    ) -> Result<Decision, SelectorError> {
        if self.config.is_authenticating(state, props) {
            debug!("authentication in progress, decision pending");
            return Ok(Decision::Pending);
        }

        if self.config.is_authenticated(state, props) {
            debug!("subject authenticated, access allowed");
            return Ok(Decision::Allow);
        }

        let location = self.redirect_location(state, props, target)?;
        debug!(location = %location, "subject not authenticated, redirecting");
        Ok(Decision::Redirect(location))
    }

    /// Compute where a denied visitor goes.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when the redirect path selector resolves to an
    /// unusable path.
    pub fn redirect_location(
        &self,
        state: &S,
        props: &P,
        target: Option<&NavigationTarget>,
    ) -> Result<RedirectLocation, SelectorError> {
        let base_path = self.config.redirect_path.resolve(state, props);
        if path_part(&base_path).is_empty() {
            warn!(path = %base_path, "redirect path selector returned an empty path");
            return Err(SelectorError::EmptyRedirectPath);
        }
        if is_malformed_path(&base_path) {
            warn!(path = %base_path, "redirect path selector returned a malformed path");
            return Err(SelectorError::InvalidRedirectPath(base_path));
        }

        let pathname = target.map_or("", |target| target.pathname.as_str());
        let include_back = self.config.allow_redirect_back.allows(props, pathname);

        Ok(self.locations.build(&base_path, target, include_back))
    }
}

/// Evaluate gates wrapped around one another, outermost first.
///
/// The first layer that does not allow access decides; inner layers are not
/// consulted after it. An empty stack allows.
///
/// # Errors
///
/// Returns the first [`SelectorError`] raised by a consulted layer.
pub fn decide_nested<'a, S, P, I>(
    layers: I,
    state: &S,
    props: &P,
    target: Option<&NavigationTarget>,
) -> Result<Decision, SelectorError>
where
    S: 'a,
    P: 'a,
    I: IntoIterator<Item = &'a AuthDecisionPolicy<S, P>>,
{
    for layer in layers {
        let decision = layer.decide(state, props, target)?;
        if !decision.is_allow() {
            return Ok(decision);
        }
    }
    Ok(Decision::Allow)
}
