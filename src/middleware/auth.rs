//! The authentication gate.
//!
//! [`AuthGate`] snapshots authentication state from an
//! [`AuthStateSource`](crate::auth::AuthStateSource), evaluates one or more
//! [`AuthConfig`] declarations against it and either lets the request through
//! or answers on the endpoint's behalf.

use std::{fmt, sync::Arc};

use http_kit::{
    middleware::MiddlewareError, Endpoint, HttpError, Middleware, Request, Response, StatusCode,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    auth::AuthStateSource,
    responder::{pending, Redirect},
    AuthConfig, AuthDecisionPolicy, Decision, NavigationTarget, RedirectLocation, SelectorError,
};

/// Error raised while answering for a denied request.
#[derive(Debug, Error)]
pub enum GateError {
    /// A redirect path selector resolved to an unusable path.
    #[error(transparent)]
    Selector(#[from] SelectorError),
    /// The computed location cannot be sent in a `Location` header.
    #[error("redirect location `{0}` is not a valid header value")]
    InvalidLocation(String),
}

impl HttpError for GateError {
    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

type FailureHandler = Arc<dyn Fn(&RedirectLocation, &Request) -> Response + Send + Sync>;
type PendingHandler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// What a denied request is answered with.
#[derive(Clone)]
pub enum FailureView {
    /// Redirect to the computed location with the given status.
    Redirect(StatusCode),
    /// Build the response yourself, e.g. render a login form in place.
    Handler(FailureHandler),
}

impl FailureView {
    /// Use a handler as the failure view.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&RedirectLocation, &Request) -> Response + Send + Sync + 'static,
    {
        Self::Handler(Arc::new(f))
    }

    fn respond(&self, location: RedirectLocation, request: &Request) -> Result<Response, GateError> {
        match self {
            Self::Redirect(status) => Redirect::with_status(location, *status).into_response(),
            Self::Handler(handler) => Ok(handler(&location, request)),
        }
    }
}

impl Default for FailureView {
    fn default() -> Self {
        Self::Redirect(StatusCode::FOUND)
    }
}

impl fmt::Debug for FailureView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redirect(status) => f.debug_tuple("Redirect").field(status).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// What a request is answered with while authentication is in progress.
#[derive(Clone, Default)]
pub enum PendingView {
    /// `503 Service Unavailable` with `Retry-After: 1`.
    #[default]
    RetryLater,
    /// Build the response yourself, e.g. a loading page.
    Handler(PendingHandler),
}

impl PendingView {
    /// Use a handler as the pending view.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        Self::Handler(Arc::new(f))
    }

    fn respond(&self, request: &Request) -> Response {
        match self {
            Self::RetryLater => pending(),
            Self::Handler(handler) => handler(request),
        }
    }
}

impl fmt::Debug for PendingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryLater => f.write_str("RetryLater"),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// Middleware gating the wrapped endpoint behind one or more declarations.
///
/// Declarations added with [`layer`](Self::layer) sit inside the first one and
/// are consulted in order; the first that does not allow access answers.
pub struct AuthGate<Src: AuthStateSource> {
    source: Src,
    layers: Arc<[AuthDecisionPolicy<Src::State, Request>]>,
    failure: FailureView,
    pending: PendingView,
}

impl<Src: AuthStateSource> AuthGate<Src> {
    /// Gate requests with `config`, reading state from `source`.
    #[must_use]
    pub fn new(source: Src, config: AuthConfig<Src::State, Request>) -> Self {
        Self {
            source,
            layers: Arc::from([AuthDecisionPolicy::new(config)]),
            failure: FailureView::default(),
            pending: PendingView::default(),
        }
    }

    /// Add a declaration evaluated after the existing ones.
    #[must_use]
    pub fn layer(self, config: AuthConfig<Src::State, Request>) -> Self {
        let mut layers = self.layers.to_vec();
        layers.push(AuthDecisionPolicy::new(config));
        Self {
            layers: Arc::from(layers),
            ..self
        }
    }

    /// Answer denied requests with `failure`.
    #[must_use]
    pub fn on_failure(self, failure: FailureView) -> Self {
        Self { failure, ..self }
    }

    /// Answer requests that are still authenticating with `pending`.
    #[must_use]
    pub fn on_pending(self, pending: PendingView) -> Self {
        Self { pending, ..self }
    }

    /// Name of the outermost declaration's redirect-back query parameter.
    ///
    /// Login handlers pass it to [`return_to`](crate::extract::return_to).
    #[must_use]
    pub fn query_param(&self) -> &str {
        self.layers[0].config().query_param()
    }

    /// Evaluate the gate for `request` without running an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when a consulted declaration's redirect path
    /// selector resolves to an unusable path.
    pub async fn decide(&self, request: &Request) -> Result<Decision, SelectorError> {
        let target = navigation_target(request);
        let state = self.source.snapshot(request).await;
        gatehouse_core::decide_nested(self.layers.iter(), &state, request, Some(&target))
    }
}

impl<Src> Clone for AuthGate<Src>
where
    Src: AuthStateSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            layers: Arc::clone(&self.layers),
            failure: self.failure.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<Src: AuthStateSource + fmt::Debug> fmt::Debug for AuthGate<Src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("source", &self.source)
            .field("layers", &self.layers.len())
            .field("failure", &self.failure)
            .field("pending", &self.pending)
            .finish()
    }
}

impl<Src> Middleware for AuthGate<Src>
where
    Src: AuthStateSource,
{
    type Error = GateError;

    async fn handle<N: Endpoint>(
        &mut self,
        request: &mut Request,
        mut next: N,
    ) -> Result<Response, MiddlewareError<N::Error, Self::Error>> {
        let decision = self.decide(request).await.map_err(|error| {
            warn!(path = %request.uri().path(), %error, "gate could not compute a redirect");
            MiddlewareError::Middleware(GateError::from(error))
        })?;

        match decision {
            Decision::Allow => next
                .respond(request)
                .await
                .map_err(MiddlewareError::Endpoint),
            Decision::Pending => {
                debug!(path = %request.uri().path(), "authentication pending");
                Ok(self.pending.respond(request))
            }
            Decision::Redirect(location) => {
                info!(
                    path = %request.uri().path(),
                    location = %location,
                    "access denied, redirecting"
                );
                self.failure
                    .respond(location, request)
                    .map_err(MiddlewareError::Middleware)
            }
        }
    }
}

/// The request's path and query as a [`NavigationTarget`].
#[must_use]
pub fn navigation_target(request: &Request) -> NavigationTarget {
    let uri = request.uri();
    NavigationTarget::new(uri.path(), uri.query().unwrap_or_default())
}
