//! Credential redaction for URLs and HTTP client errors.

use url::Url;

/// Drop userinfo, query and fragment from a URL.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut u = url.clone();
    let _ = u.set_username("");
    let _ = u.set_password(None);
    u.set_query(None);
    u.set_fragment(None);
    u.to_string()
}

/// Like [`redact_url`] for raw strings; unparseable input is returned unchanged.
#[must_use]
pub fn redact_url_str(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |u| redact_url(&u))
}

/// Render a `reqwest` error with any embedded URL redacted.
#[must_use]
pub fn sanitize_reqwest_error(e: &reqwest::Error) -> String {
    let mut msg = e.to_string();
    if let Some(u) = e.url() {
        msg = msg.replace(u.as_str(), &redact_url(u));
    }
    msg
}
