use http::header::{HeaderValue, CACHE_CONTROL, LOCATION, RETRY_AFTER};
use http_kit::{Body, Response, StatusCode};

use crate::{middleware::GateError, RedirectLocation};

/// A redirect to a computed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    location: RedirectLocation,
    status: StatusCode,
}

impl Redirect {
    /// `302 Found`.
    #[must_use]
    pub const fn found(location: RedirectLocation) -> Self {
        Self::with_status(location, StatusCode::FOUND)
    }

    /// `303 See Other`.
    #[must_use]
    pub const fn see_other(location: RedirectLocation) -> Self {
        Self::with_status(location, StatusCode::SEE_OTHER)
    }

    /// `307 Temporary Redirect`, keeping the request method.
    #[must_use]
    pub const fn temporary(location: RedirectLocation) -> Self {
        Self::with_status(location, StatusCode::TEMPORARY_REDIRECT)
    }

    /// Redirect with an arbitrary status.
    #[must_use]
    pub const fn with_status(location: RedirectLocation, status: StatusCode) -> Self {
        Self { location, status }
    }

    /// The destination.
    #[must_use]
    pub const fn location(&self) -> &RedirectLocation {
        &self.location
    }

    /// Build the response.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidLocation`] if the location cannot be
    /// written into a `Location` header.
    pub fn into_response(self) -> Result<Response, GateError> {
        let location = self.location.to_string();
        let value = HeaderValue::from_str(&location)
            .map_err(|_| GateError::InvalidLocation(location.clone()))?;

        let mut response = Response::new(Body::empty());
        *response.status_mut() = self.status;
        response.headers_mut().insert(LOCATION, value);
        // The answer depends on who is asking.
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        Ok(response)
    }
}

/// `503 Service Unavailable` with `Retry-After: 1`.
#[must_use]
pub fn pending() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
    response
        .headers_mut()
        .insert(RETRY_AFTER, HeaderValue::from_static("1"));
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use http::header::{LOCATION, RETRY_AFTER};
    use http_kit::StatusCode;

    use super::{pending, Redirect};
    use crate::{middleware::GateError, RedirectLocation};

    #[test]
    fn writes_location_header() {
        let location = RedirectLocation::new("/login", "?redirect=%2Fauth");
        let response = Redirect::found(location).into_response().unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/login?redirect=%2Fauth"
        );
    }

    #[test]
    fn honours_status() {
        let location = RedirectLocation::new("/login", "");
        let response = Redirect::see_other(location).into_response().unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn rejects_unrepresentable_location() {
        let location = RedirectLocation::new("/login\n", "");
        let error = Redirect::found(location).into_response().unwrap_err();
        assert!(matches!(error, GateError::InvalidLocation(_)));
    }

    #[test]
    fn pending_asks_to_retry() {
        let response = pending();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "1");
    }
}
