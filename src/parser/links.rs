//! Site URL helpers.

use url::Url;

/// Public address of the tracker; stamped as `engine_url` on every record.
pub const ENGINE_URL: &str = "https://www.torrentbd.com";

/// Joins a base URL and a path with exactly one `/` between them.
///
/// ```
/// use torrentbd::parser::join_url_paths;
///
/// assert_eq!(join_url_paths("http://a.com/", "/down"), "http://a.com/down");
/// ```
#[must_use]
pub fn join_url_paths(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Resolves `href` against `base` using standard relative-URL rules.
///
/// An href that cannot be resolved is returned unchanged.
#[must_use]
pub fn resolve_href(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(resolved) => resolved.into(),
        Err(_) => href.to_string(),
    }
}
