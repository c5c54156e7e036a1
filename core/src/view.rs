//! View selection for one protected-view instance.
//!
//! [`ViewState`] is the state machine; [`ViewSelector`] drives it from the
//! gate's predicates and tells the host what to render.

use tracing::debug;

use crate::{
    error::SelectorError,
    location::{NavigationTarget, RedirectLocation},
    navigate::{NavigationGuard, Navigator},
    policy::AuthDecisionPolicy,
};

/// Where a protected-view instance stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// Initial state; authentication not yet settled.
    #[default]
    Unknown,
    /// Access denied; a redirect is pending or has been emitted.
    Denied,
    /// Protected view rendered.
    Granted,
}

impl ViewState {
    /// Advance the machine with freshly evaluated predicates.
    ///
    /// - `Unknown` waits while authenticating, then settles on `Granted` or `Denied`.
    /// - `Granted` falls to `Denied` as soon as the subject stops being
    ///   authenticated.
    /// - `Denied` only leaves for `Unknown`, when authentication starts again.
    #[must_use]
    pub const fn next(self, authenticating: bool, authenticated: bool) -> Self {
        match (self, authenticating, authenticated) {
            (Self::Denied, true, _) | (Self::Unknown, true, _) => Self::Unknown,
            (Self::Denied, false, _) | (Self::Unknown | Self::Granted, _, false) => Self::Denied,
            (Self::Unknown | Self::Granted, _, true) => Self::Granted,
        }
    }
}

/// What the host renders for a protected-view instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// The protected view itself.
    Protected,
    /// Nothing, or a loading element.
    Loading,
    /// The failure view, carrying the freshly computed redirect location.
    Failure(RedirectLocation),
}

/// Tracks one protected-view instance across evaluations.
///
/// The host feeds every observed change of state or target to
/// [`update`](Self::update) in order. Each denial recomputes the redirect
/// location from the latest inputs.
#[derive(Debug)]
pub struct ViewSelector<'a, S, P> {
    policy: &'a AuthDecisionPolicy<S, P>,
    state: ViewState,
    guard: NavigationGuard,
}

impl<'a, S, P> ViewSelector<'a, S, P> {
    /// Start a fresh instance in [`ViewState::Unknown`].
    #[must_use]
    pub const fn new(policy: &'a AuthDecisionPolicy<S, P>) -> Self {
        Self {
            policy,
            state: ViewState::Unknown,
            guard: NavigationGuard::new(),
        }
    }

    /// Current state of the machine.
    #[must_use]
    pub const fn state(&self) -> ViewState {
        self.state
    }

    /// Advance the machine and select the view to render.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when the instance is denied and the redirect
    /// path selector resolves to an unusable path. The state still advances.
    pub fn update(
        &mut self,
        auth: &S,
        props: &P,
        target: Option<&NavigationTarget>,
    ) -> Result<View, SelectorError> {
        let config = self.policy.config();
        let authenticating = config.is_authenticating(auth, props);
        let authenticated = config.is_authenticated(auth, props);

        let previous = self.state;
        self.state = previous.next(authenticating, authenticated);
        if previous != self.state {
            debug!(from = ?previous, to = ?self.state, "view state changed");
        }
        if previous == ViewState::Denied && self.state != ViewState::Denied {
            self.guard.reset();
        }

        match self.state {
            ViewState::Unknown => Ok(View::Loading),
            ViewState::Granted => Ok(View::Protected),
            ViewState::Denied => self
                .policy
                .redirect_location(auth, props, target)
                .map(View::Failure),
        }
    }

    /// Like [`update`](Self::update), additionally reporting whether an
    /// imperative host should navigate now.
    ///
    /// Navigation is reported once per distinct target pathname while the
    /// instance stays denied; leaving the denied state re-arms it.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn update_navigation(
        &mut self,
        auth: &S,
        props: &P,
        target: Option<&NavigationTarget>,
    ) -> Result<(View, bool), SelectorError> {
        let view = self.update(auth, props, target)?;
        let navigate = matches!(view, View::Failure(_)) && self.guard.should_navigate(target);
        Ok((view, navigate))
    }

    /// Like [`update_navigation`](Self::update_navigation), calling
    /// `navigator` when navigation is due.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn navigate<N: Navigator>(
        &mut self,
        auth: &S,
        props: &P,
        target: Option<&NavigationTarget>,
        navigator: &mut N,
    ) -> Result<View, SelectorError> {
        let (view, navigate) = self.update_navigation(auth, props, target)?;
        if let (View::Failure(location), true) = (&view, navigate) {
            debug!(location = %location, "navigating");
            navigator.navigate(location);
        }
        Ok(view)
    }
}
