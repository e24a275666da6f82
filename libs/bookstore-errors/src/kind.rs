use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure class of a backend call.
///
/// Every failure observed by the client (transport error or non-2xx response)
/// maps to exactly one class. Status `0` is the conventional "no response"
/// status and maps to [`ErrorKind::Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Server unreachable (status 0, connection refused, DNS, TLS, timeout)
    Network,
    /// 400 Bad Request
    Validation,
    /// 401 Unauthorized
    Unauthenticated,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 429 Too Many Requests
    RateLimited,
    /// 5xx
    Server,
    /// An HTML error page came back where the API speaks JSON
    HtmlPage,
    /// Anything else
    Unexpected,
}

impl ErrorKind {
    /// Classify a raw status code.
    ///
    /// `body_is_html` is only consulted for statuses that have no class of
    /// their own, so a 404 HTML page still reads as [`ErrorKind::NotFound`].
    #[must_use]
    pub fn classify(status: u16, body_is_html: bool) -> Self {
        match status {
            0 => Self::Network,
            400 => Self::Validation,
            401 => Self::Unauthenticated,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::Server,
            _ if body_is_html => Self::HtmlPage,
            _ => Self::Unexpected,
        }
    }

    /// Classify a typed status code.
    #[must_use]
    pub fn from_status(status: StatusCode, body_is_html: bool) -> Self {
        Self::classify(status.as_u16(), body_is_html)
    }

    /// Stable machine-readable name, used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Validation => "validation",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::HtmlPage => "html_page",
            Self::Unexpected => "unexpected",
        }
    }

    /// Whether a call site should send the user back to the login page.
    #[must_use]
    pub fn requires_login(self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Forbidden)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heuristic used by the error normalizer: does this body look like an HTML
/// document rather than a JSON payload?
#[must_use]
pub fn looks_like_html(content_type: Option<&str>, body: &[u8]) -> bool {
    if content_type.is_some_and(|ct| ct.to_ascii_lowercase().starts_with("text/html")) {
        return true;
    }

    let trimmed = body.trim_ascii_start();
    let head = &trimmed[..trimmed.len().min(16)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn classifies_fixed_statuses() {
        assert_eq!(ErrorKind::classify(0, false), ErrorKind::Network);
        assert_eq!(ErrorKind::classify(400, false), ErrorKind::Validation);
        assert_eq!(ErrorKind::classify(401, false), ErrorKind::Unauthenticated);
        assert_eq!(ErrorKind::classify(403, false), ErrorKind::Forbidden);
        assert_eq!(ErrorKind::classify(404, false), ErrorKind::NotFound);
        assert_eq!(ErrorKind::classify(429, false), ErrorKind::RateLimited);
    }

    #[test]
    fn whole_5xx_range_is_server() {
        for status in [500, 502, 503, 504, 599] {
            assert_eq!(ErrorKind::classify(status, false), ErrorKind::Server);
        }
    }

    #[test]
    fn html_only_applies_to_unclassified_statuses() {
        assert_eq!(ErrorKind::classify(404, true), ErrorKind::NotFound);
        assert_eq!(ErrorKind::classify(200, true), ErrorKind::HtmlPage);
        assert_eq!(ErrorKind::classify(405, true), ErrorKind::HtmlPage);
        assert_eq!(ErrorKind::classify(409, false), ErrorKind::Unexpected);
    }

    #[test]
    fn login_redirect_classes() {
        assert!(ErrorKind::Unauthenticated.requires_login());
        assert!(ErrorKind::Forbidden.requires_login());
        assert!(!ErrorKind::NotFound.requires_login());
        assert!(!ErrorKind::Network.requires_login());
    }

    #[test]
    fn html_detection_by_content_type() {
        assert!(looks_like_html(Some("text/html; charset=utf-8"), b"whatever"));
        assert!(!looks_like_html(Some("application/json"), b"{}"));
    }

    #[test]
    fn html_detection_by_body_prefix() {
        assert!(looks_like_html(None, b"  <!DOCTYPE html><html></html>"));
        assert!(looks_like_html(None, b"<HTML><body>502</body></HTML>"));
        assert!(!looks_like_html(None, br#"{"message":"x"}"#));
        assert!(!looks_like_html(None, b""));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::RateLimited).unwrap();
        assert_eq!(json, "\"rate_limited\"");
    }
}
