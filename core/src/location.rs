use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_QUERY_PARAM;

/// The location a protected view was requested at.
///
/// `search` is either empty or starts with `?`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationTarget {
    /// Path component, e.g. `/auth`.
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    #[serde(default)]
    pub search: String,
}

impl NavigationTarget {
    /// Create a target from a path and a query string.
    ///
    /// A missing leading `?` on a non-empty `search` is added.
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: normalize_search(search.into()),
        }
    }

    /// Split a `path?query#fragment` string. The fragment is dropped.
    #[must_use]
    pub fn parse(path_and_query: &str) -> Self {
        let (path, query) = split_path(path_and_query);
        Self::new(path, query)
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pathname, self.search)
    }
}

/// Where a denied view sends its visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RedirectLocation {
    /// Path component of the destination.
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    #[serde(default)]
    pub search: String,
}

impl RedirectLocation {
    /// Create a location from a path and a query string.
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: normalize_search(search.into()),
        }
    }
}

impl fmt::Display for RedirectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pathname, self.search)
    }
}

/// Builds [`RedirectLocation`]s, optionally carrying the original target in a
/// query parameter so the visitor can be sent back after authenticating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectLocationBuilder {
    param: String,
}

impl Default for RedirectLocationBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_PARAM)
    }
}

impl RedirectLocationBuilder {
    /// Create a builder writing the redirect-back target under `param`.
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }

    /// Name of the redirect-back query parameter.
    #[must_use]
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Build the destination for `base_path`.
    ///
    /// Query parameters already present on `base_path` are kept in order,
    /// except an existing redirect-back parameter, which is always removed.
    /// When `include_back` is set and a target is known, `pathname + search`
    /// of the target is appended as a single encoded component.
    #[must_use]
    pub fn build(
        &self,
        base_path: &str,
        target: Option<&NavigationTarget>,
        include_back: bool,
    ) -> RedirectLocation {
        let (pathname, base_query) = split_path(base_path);

        let mut pairs: Vec<Cow<'_, str>> = base_query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty() && !self.is_param(pair))
            .map(Cow::Borrowed)
            .collect();

        if let Some(target) = target.filter(|_| include_back) {
            pairs.push(Cow::Owned(format!(
                "{}={}",
                urlencoding::encode(&self.param),
                urlencoding::encode(&target.to_string())
            )));
        }

        let search = if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        };

        RedirectLocation {
            pathname: pathname.to_owned(),
            search,
        }
    }

    /// Read the redirect-back target out of a query string.
    ///
    /// Accepts `search` with or without its leading `?`. Returns the decoded
    /// value of the first occurrence of the parameter; bytes that are not
    /// UTF-8 after decoding become `U+FFFD`.
    #[must_use]
    pub fn redirect_param(&self, search: &str) -> Option<String> {
        decode_pairs(search.trim_start_matches('?'))
            .into_iter()
            .find(|(key, _)| *key == self.param)
            .map(|(_, value)| value)
    }

    fn is_param(&self, pair: &str) -> bool {
        decode_pairs(pair)
            .first()
            .is_some_and(|(key, _)| *key == self.param)
    }
}

fn decode_pairs(query: &str) -> Vec<(String, String)> {
    // Decoding is lossy and does not fail for string pairs.
    serde_urlencoded::from_str(query).unwrap_or_default()
}

/// The path part of `path`, without query or fragment.
pub(crate) fn path_part(path: &str) -> &str {
    split_path(path).0
}

fn split_path(path: &str) -> (&str, &str) {
    let path = path.split_once('#').map_or(path, |(path, _)| path);
    path.split_once('?')
        .map_or((path, ""), |(path, query)| (path, query))
}

fn normalize_search(search: String) -> String {
    if search.is_empty() || search.starts_with('?') {
        search
    } else {
        format!("?{search}")
    }
}

#[cfg(test)]
mod tests {
    use super::{NavigationTarget, RedirectLocation, RedirectLocationBuilder};

    fn builder() -> RedirectLocationBuilder {
        RedirectLocationBuilder::default()
    }

    #[test]
    fn encodes_bare_pathname() {
        let target = NavigationTarget::parse("/auth");
        let location = builder().build("/login", Some(&target), true);
        assert_eq!(location, RedirectLocation::new("/login", "?redirect=%2Fauth"));
    }

    #[test]
    fn encodes_pathname_with_query() {
        let target = NavigationTarget::parse("/auth?test=foo");
        let location = builder().build("/login", Some(&target), true);
        assert_eq!(location.pathname, "/login");
        assert_eq!(location.search, "?redirect=%2Fauth%3Ftest%3Dfoo");
    }

    #[test]
    fn appends_after_existing_base_query() {
        let target = NavigationTarget::parse("/auth");
        let location = builder().build("/login?lang=en&mode=full", Some(&target), true);
        assert_eq!(location.pathname, "/login");
        assert_eq!(location.search, "?lang=en&mode=full&redirect=%2Fauth");
    }

    #[test]
    fn replaces_redirect_param_already_on_base_path() {
        let target = NavigationTarget::parse("/auth");
        let location = builder().build("/login?redirect=%2Fstale&lang=en", Some(&target), true);
        assert_eq!(location.search, "?lang=en&redirect=%2Fauth");
        assert_eq!(location.search.matches("redirect=").count(), 1);
    }

    #[test]
    fn omits_param_when_redirect_back_is_disabled() {
        let target = NavigationTarget::parse("/auth?test=foo");
        let location = builder().build("/login?redirect=%2Fstale", Some(&target), false);
        assert_eq!(location, RedirectLocation::new("/login", ""));
    }

    #[test]
    fn omits_param_without_target() {
        let location = builder().build("/login", None, true);
        assert_eq!(location, RedirectLocation::new("/login", ""));
    }

    #[test]
    fn honours_custom_param_name() {
        let target = NavigationTarget::parse("/settings");
        let location = RedirectLocationBuilder::new("next").build("/", Some(&target), true);
        assert_eq!(location.to_string(), "/?next=%2Fsettings");
    }

    #[test]
    fn decodes_what_it_encodes() {
        let builder = builder();
        let target = NavigationTarget::parse("/a b/c?x=1&y=%2F+z");
        let location = builder.build("/login?lang=en", Some(&target), true);
        assert_eq!(
            builder.redirect_param(&location.search).as_deref(),
            Some("/a b/c?x=1&y=%2F+z")
        );
    }

    #[test]
    fn redirect_param_decodes_form_values() {
        let builder = builder();
        assert_eq!(
            builder.redirect_param("redirect=%2Fa+b&redirect=%2Fc").as_deref(),
            Some("/a b")
        );
        assert_eq!(
            builder.redirect_param("?redirect=%2Fa%FF").as_deref(),
            Some("/a\u{FFFD}")
        );
    }

    #[test]
    fn strips_encoded_redirect_key_from_base_path() {
        let target = NavigationTarget::parse("/auth");
        let location = RedirectLocationBuilder::new("next page")
            .build("/login?next+page=%2Fstale&lang=en", Some(&target), true);
        assert_eq!(location.search, "?lang=en&next%20page=%2Fauth");
    }

    #[test]
    fn redirect_param_is_absent_when_not_in_query() {
        assert_eq!(builder().redirect_param("?lang=en"), None);
        assert_eq!(builder().redirect_param(""), None);
    }

    #[test]
    fn build_is_deterministic() {
        let target = NavigationTarget::parse("/auth?test=foo");
        let first = builder().build("/login", Some(&target), true);
        let second = builder().build("/login", Some(&target), true);
        assert_eq!(first, second);
    }

    #[test]
    fn parse_drops_fragment_and_normalizes_search() {
        let target = NavigationTarget::parse("/docs?page=2#intro");
        assert_eq!(target, NavigationTarget::new("/docs", "page=2"));
        assert_eq!(target.search, "?page=2");
        assert_eq!(NavigationTarget::parse("/docs?").search, "");
    }
}
