//! Login redirect targets.
//!
//! Anonymous requests to protected pages are sent to
//! `/auth/login?next=<path>`; after login the user returns to `next`, but only
//! if it is a local absolute path.

use crate::error::LOGIN_PATH;

/// Builds the login URL that returns to `target` (path plus optional query).
///
/// `/` is left as is; every other reserved character is percent-encoded.
pub fn login_redirect(target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{}?next={}", LOGIN_PATH, encoded.replace("%2F", "/"))
}

/// Accepts `next` only when it points back into this site and can be sent
/// back verbatim in a `Location` header.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && n.chars().all(|c| c.is_ascii_graphic())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_is_unescaped() {
        assert_eq!(login_redirect("/create"), "/auth/login?next=/create");
        assert_eq!(
            login_redirect("/posts/7/edit"),
            "/auth/login?next=/posts/7/edit"
        );
        assert_eq!(
            login_redirect("/profile/leo/follow"),
            "/auth/login?next=/profile/leo/follow"
        );
    }

    #[test]
    fn test_query_is_encoded() {
        assert_eq!(
            login_redirect("/follow?page=2"),
            "/auth/login?next=/follow%3Fpage%3D2"
        );
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/create")), Some("/create"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(None), None);
    }
}
