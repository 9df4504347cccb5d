//! Host origin discovery.
//!
//! A plugin has to know which origin embeds it before it can address
//! messages to the parent frame. Browsers expose this through
//! `location.ancestorOrigins` (Chromium, WebKit) and, less reliably, through
//! `document.referrer`.

use url::Url;

/// Origin used when neither ancestor origins nor a referrer are available.
pub const DEFAULT_PARENT_ORIGIN: &str = "https://platform.zenginehq.com";

/// Pick the origin of the embedding frame.
///
/// The nearest ancestor origin wins, then the referrer's origin, then
/// [`DEFAULT_PARENT_ORIGIN`]. Empty strings count as absent.
pub fn resolve_parent_origin<S: AsRef<str>>(ancestor_origins: &[S], referrer: Option<&str>) -> String {
    if let Some(first) = ancestor_origins.first().map(AsRef::as_ref) {
        if !first.is_empty() {
            return first.to_string();
        }
    }

    referrer
        .filter(|r| !r.is_empty())
        .and_then(origin_of)
        .unwrap_or_else(|| DEFAULT_PARENT_ORIGIN.to_string())
}

/// Serialized origin (`scheme://host[:port]`) of an absolute URL.
///
/// Returns `None` for unparseable URLs and for URLs with an opaque origin
/// such as `data:` or `file:`.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn nearest_ancestor_wins() {
        let ancestors = ["https://acme.zenginehq.com", "https://outer.example"];
        assert_eq!(
            resolve_parent_origin(&ancestors, Some("https://other.example/page")),
            "https://acme.zenginehq.com"
        );
    }

    #[test]
    fn falls_back_to_referrer_origin() {
        assert_eq!(
            resolve_parent_origin(&NONE, Some("https://host.example:8443/workspaces/1?x=y#frag")),
            "https://host.example:8443"
        );
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(resolve_parent_origin(&NONE, None), DEFAULT_PARENT_ORIGIN);
        assert_eq!(resolve_parent_origin(&[""], Some("")), DEFAULT_PARENT_ORIGIN);
        assert_eq!(
            resolve_parent_origin(&NONE, Some("not a url")),
            DEFAULT_PARENT_ORIGIN
        );
    }

    #[test]
    fn opaque_origins_are_rejected() {
        assert_eq!(origin_of("data:text/plain,hi"), None);
        assert_eq!(
            origin_of("http://user:pw@Example.COM:80/path").as_deref(),
            Some("http://example.com")
        );
    }
}
