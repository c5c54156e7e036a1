//! Imperative navigation behind a one-shot guard.
//!
//! Hosts that render a redirect declaratively need none of this. Hosts that
//! call an explicit `navigate(location)` may evaluate the same denial several
//! times per transition; [`GuardedNavigator`] makes sure the call happens once
//! per distinct pathname while the view stays denied. Hosts driving a
//! [`ViewSelector`](crate::ViewSelector) can use
//! [`ViewSelector::navigate`](crate::ViewSelector::navigate) instead.

use tracing::{debug, trace};

use crate::{
    location::{NavigationTarget, RedirectLocation},
    view::View,
};

/// The host's imperative navigation primitive.
pub trait Navigator {
    /// Change the current route to `location`.
    fn navigate(&mut self, location: &RedirectLocation);
}

impl<F> Navigator for F
where
    F: FnMut(&RedirectLocation),
{
    fn navigate(&mut self, location: &RedirectLocation) {
        self(location);
    }
}

/// Remembers the pathname a navigation was last triggered for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationGuard {
    last_triggered: Option<String>,
}

impl NavigationGuard {
    /// A guard that has not triggered yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_triggered: None,
        }
    }

    /// Returns `true` and records the pathname if navigation has not yet been
    /// triggered for it. An unknown target counts as the empty pathname.
    pub fn should_navigate(&mut self, target: Option<&NavigationTarget>) -> bool {
        let pathname = target.map_or("", |target| target.pathname.as_str());
        if self.last_triggered.as_deref() == Some(pathname) {
            trace!(pathname, "navigation already triggered for pathname");
            return false;
        }
        self.last_triggered = Some(pathname.to_owned());
        true
    }

    /// The pathname navigation was last triggered for.
    #[must_use]
    pub fn last_triggered(&self) -> Option<&str> {
        self.last_triggered.as_deref()
    }

    /// Forget the last pathname so the next denial navigates again.
    pub fn reset(&mut self) {
        self.last_triggered = None;
    }
}

/// A [`Navigator`] that navigates at most once per distinct pathname.
#[derive(Debug, Clone, Default)]
pub struct GuardedNavigator<N> {
    navigator: N,
    guard: NavigationGuard,
}

impl<N: Navigator> GuardedNavigator<N> {
    /// Guard `navigator`.
    pub const fn new(navigator: N) -> Self {
        Self {
            navigator,
            guard: NavigationGuard::new(),
        }
    }

    /// Act on every view the host renders.
    ///
    /// A failure view navigates to its location, once per pathname. Any other
    /// view re-arms the guard, so a later denial on the same pathname
    /// navigates again. Returns whether the navigator was called.
    pub fn follow(&mut self, view: &View, target: Option<&NavigationTarget>) -> bool {
        match view {
            View::Failure(location) => self.redirect(location, target),
            View::Protected | View::Loading => {
                self.guard.reset();
                false
            }
        }
    }

    /// Navigate to `location` unless this pathname already triggered a
    /// navigation. Returns whether the navigator was called.
    ///
    /// Only denials are seen here; call [`reset`](Self::reset) when access is
    /// granted in between, or use [`follow`](Self::follow).
    pub fn redirect(
        &mut self,
        location: &RedirectLocation,
        target: Option<&NavigationTarget>,
    ) -> bool {
        if !self.guard.should_navigate(target) {
            return false;
        }
        debug!(location = %location, "navigating");
        self.navigator.navigate(location);
        true
    }

    /// Forget the last pathname.
    pub fn reset(&mut self) {
        self.guard.reset();
    }

    /// Access the guard.
    pub const fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Access the wrapped navigator.
    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Unwrap the navigator.
    pub fn into_inner(self) -> N {
        self.navigator
    }
}
