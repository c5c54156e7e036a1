//! Responses a gate answers with instead of the protected endpoint.
//!
//! [`Redirect`] turns a [`RedirectLocation`](crate::RedirectLocation) into a
//! redirect response; [`pending`] is the default answer while authentication
//! is still being established.
mod redirect;

pub use redirect::{pending, Redirect};
