use reqwest::Url;

/// Pages that need a signed-in user
pub const PROTECTED_ROUTES: &[&str] = &["/favorites", "/profile"];

/// Pages a signed-in user is sent away from
pub const AUTH_ROUTES: &[&str] = &["/login", "/signup"];

/// Outcome of checking a navigation against the auth cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

/// Matches `/favorites` and `/favorites/...` but not `/favoritesx`
fn under(path: &str, route: &str) -> bool {
    path == route
        || path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
}

/// `/login?redirect=<path>` with the path form-encoded
fn login_redirect(path: &str) -> String {
    match Url::parse("http://localhost/login") {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("redirect", path);
            format!("/login?{}", url.query().unwrap_or_default())
        }
        Err(_) => "/login".to_string(),
    }
}

/// Decides whether a navigation to `path` may proceed
///
/// Only the presence of the token is checked; its validity is the
/// session's concern.
pub fn guard(path: &str, has_token: bool) -> RouteDecision {
    if !has_token && PROTECTED_ROUTES.iter().any(|route| under(path, route)) {
        tracing::debug!(path = %path, "Protected route without token");
        return RouteDecision::Redirect(login_redirect(path));
    }

    if has_token && AUTH_ROUTES.iter().any(|route| under(path, route)) {
        return RouteDecision::Redirect("/".to_string());
    }

    RouteDecision::Allow
}
