use tracing::warn;

use crate::{RedirectLocationBuilder, Request};

/// The redirect-back target carried in `request`'s query under `param`.
///
/// Only same-origin absolute paths are returned (see [`is_local_path`]); a
/// value pointing anywhere else is dropped so the parameter cannot be used as
/// an open redirect.
#[must_use]
pub fn return_to(request: &Request, param: &str) -> Option<String> {
    let query = request.uri().query().unwrap_or_default();
    let target = RedirectLocationBuilder::new(param).redirect_param(query)?;

    if is_local_path(&target) {
        Some(target)
    } else {
        warn!(%target, "ignoring redirect-back target outside this origin");
        None
    }
}

/// [`return_to`], or `fallback` when there is no usable target.
#[must_use]
pub fn return_to_or(request: &Request, param: &str, fallback: &str) -> String {
    return_to(request, param).unwrap_or_else(|| fallback.to_owned())
}

/// `true` for paths starting with a single `/`, free of backslashes and
/// control characters.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}
