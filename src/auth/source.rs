use std::{fmt, future::Future, marker::PhantomData};

use crate::Request;

/// Supplies the authentication state a gate evaluates against.
///
/// Called once per request, before any predicate runs. The snapshot is not
/// retained after the decision.
pub trait AuthStateSource: Send + Sync + 'static {
    /// The state handed to the gate's predicates and selectors.
    type State: Send + 'static;

    /// Take a snapshot of the state for this request.
    fn snapshot(&self, request: &Request) -> impl Future<Output = Self::State> + Send;
}

/// Reads a `T` an earlier middleware inserted into the request extensions.
///
/// The snapshot is `None` when nothing was inserted, which predicates usually
/// treat as "not authenticated".
pub struct ExtensionState<T>(PhantomData<fn() -> T>);

impl<T> ExtensionState<T> {
    /// Create the source.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ExtensionState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ExtensionState<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ExtensionState<T> {}

impl<T> fmt::Debug for ExtensionState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtensionState")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T> AuthStateSource for ExtensionState<T>
where
    T: Clone + Send + Sync + 'static,
{
    type State = Option<T>;

    async fn snapshot(&self, request: &Request) -> Self::State {
        request.extensions().get::<T>().cloned()
    }
}

/// A source backed by a synchronous function of the request.
#[derive(Clone)]
pub struct FnSource<F>(F);

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSource")
    }
}

/// Build a source from a function of the request.
pub const fn from_fn<F, S>(f: F) -> FnSource<F>
where
    F: Fn(&Request) -> S + Send + Sync + 'static,
    S: Send + 'static,
{
    FnSource(f)
}

impl<F, S> AuthStateSource for FnSource<F>
where
    F: Fn(&Request) -> S + Send + Sync + 'static,
    S: Send + 'static,
{
    type State = S;

    fn snapshot(&self, request: &Request) -> impl Future<Output = Self::State> + Send {
        std::future::ready((self.0)(request))
    }
}

#[cfg(test)]
mod tests {
    use http::header::COOKIE;

    use super::{from_fn, AuthStateSource, ExtensionState};
    use crate::{Body, Request};

    #[derive(Debug, Clone, PartialEq)]
    struct Session {
        user: String,
    }

    #[tokio::test]
    async fn reads_inserted_extension() {
        let mut request = Request::new(Body::empty());
        request.extensions_mut().insert(Session {
            user: "alice".to_owned(),
        });

        let state = ExtensionState::<Session>::new().snapshot(&request).await;
        assert_eq!(
            state,
            Some(Session {
                user: "alice".to_owned()
            })
        );
    }

    #[tokio::test]
    async fn missing_extension_is_none() {
        let request = Request::new(Body::empty());
        let state = ExtensionState::<Session>::new().snapshot(&request).await;
        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn function_source_sees_the_request() {
        let source = from_fn(|request: &Request| request.headers().contains_key(COOKIE));

        let mut request = Request::new(Body::empty());
        assert!(!source.snapshot(&request).await);

        request
            .headers_mut()
            .insert(COOKIE, http::HeaderValue::from_static("sid=1"));
        assert!(source.snapshot(&request).await);
    }
}
