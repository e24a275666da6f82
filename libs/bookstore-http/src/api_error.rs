use crate::envelope::BackendFailure;
use crate::error::HttpError;
use bookstore_errors::{BackendCode, ErrorKind, MessageDef, message_for};
use http::StatusCode;
use std::fmt;
use std::time::Duration;

/// What the normalized failure was built from.
#[derive(Debug)]
#[non_exhaustive]
pub enum ApiErrorOrigin {
    /// Nothing came back: connection, TLS or timeout failure.
    Transport(Box<HttpError>),
    /// A response came back with a failing status or a failure envelope.
    Status {
        body_preview: String,
        content_type: Option<String>,
    },
}

/// A backend call failure reduced to one class and one user-facing message.
///
/// Produced by [`ErrorNormalizeLayer`](crate::ErrorNormalizeLayer) for every
/// transport error and non-2xx response, and by envelope decoding for
/// `succeeded: false` payloads and HTML pages served with 200.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    status: Option<StatusCode>,
    backend: Option<BackendFailure>,
    retry_after: Option<Duration>,
    origin: ApiErrorOrigin,
}

impl ApiError {
    /// Failure with no response: status 0.
    #[must_use]
    pub fn network(source: HttpError) -> Self {
        Self {
            kind: ErrorKind::Network,
            status: None,
            backend: None,
            retry_after: None,
            origin: ApiErrorOrigin::Transport(Box::new(source)),
        }
    }

    /// Failure built from a response status and a bounded body preview.
    #[must_use]
    pub fn from_response(
        status: StatusCode,
        content_type: Option<String>,
        body_preview: String,
        retry_after: Option<Duration>,
    ) -> Self {
        let html = bookstore_errors::looks_like_html(content_type.as_deref(), body_preview.as_bytes());
        let backend = if html {
            None
        } else {
            BackendFailure::from_body(body_preview.as_bytes())
        };
        Self {
            kind: ErrorKind::from_status(status, html),
            status: Some(status),
            backend,
            retry_after,
            origin: ApiErrorOrigin::Status {
                body_preview,
                content_type,
            },
        }
    }

    /// Failure envelope delivered under a successful transport status.
    #[must_use]
    pub fn from_envelope(status: StatusCode, failure: BackendFailure) -> Self {
        Self {
            kind: failure.kind_hint(),
            status: Some(status),
            backend: Some(failure),
            retry_after: None,
            origin: ApiErrorOrigin::Status {
                body_preview: String::new(),
                content_type: None,
            },
        }
    }

    /// An HTML document where a JSON payload was expected.
    #[must_use]
    pub fn html_page(status: StatusCode, content_type: Option<String>, body_preview: String) -> Self {
        Self {
            kind: ErrorKind::HtmlPage,
            status: Some(status),
            backend: None,
            retry_after: None,
            origin: ApiErrorOrigin::Status {
                body_preview,
                content_type,
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Response status, `None` when nothing came back.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Numeric status with `0` standing for "no response".
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.map_or(0, |s| s.as_u16())
    }

    /// Catalog entry for this failure's class.
    #[must_use]
    pub fn catalog(&self) -> &'static MessageDef {
        message_for(self.kind)
    }

    /// Fixed message for this failure's class.
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.catalog().message
    }

    /// Parsed backend failure body, when there was one.
    #[must_use]
    pub fn backend(&self) -> Option<&BackendFailure> {
        self.backend.as_ref()
    }

    #[must_use]
    pub fn backend_code(&self) -> Option<BackendCode> {
        self.backend.as_ref().and_then(BackendFailure::backend_code)
    }

    /// Message to show the user: the translated backend code when known,
    /// the class message otherwise.
    #[must_use]
    pub fn localized_message(&self) -> &'static str {
        self.backend_code()
            .map_or_else(|| self.message(), BackendCode::message)
    }

    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    #[must_use]
    pub fn origin(&self) -> &ApiErrorOrigin {
        &self.origin
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}): {}", self.kind, self.status_code(), self.localized_message())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.origin {
            ApiErrorOrigin::Transport(err) => Some(err.as_ref()),
            ApiErrorOrigin::Status { .. } => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::non_ascii_literal)]

    use super::*;
    use std::error::Error;

    #[test]
    fn network_failure_has_status_zero_and_fixed_message() {
        let err = ApiError::network(HttpError::Timeout(Duration::from_secs(5)));
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status_code(), 0);
        assert_eq!(
            err.localized_message(),
            "لا يمكن الاتصال بالخادم. تأكد من اتصالك بالإنترنت"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn legacy_backend_text_is_translated() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            Some("application/json".into()),
            r#"{"message":"Username is already taken"}"#.into(),
            None,
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.backend_code(), Some(BackendCode::UsernameTaken));
        assert_eq!(err.localized_message(), "اسم المستخدم موجود بالفعل");
    }

    #[test]
    fn unknown_backend_text_falls_back_to_class_message() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            None,
            r#"{"message":"Something odd"}"#.into(),
            None,
        );
        assert_eq!(err.backend_code(), None);
        assert_eq!(err.localized_message(), err.message());
    }

    #[test]
    fn html_body_on_unclassified_status_is_html_page() {
        let err = ApiError::from_response(
            StatusCode::IM_A_TEAPOT,
            Some("text/html; charset=utf-8".into()),
            "<html><body>teapot</body></html>".into(),
            None,
        );
        assert_eq!(err.kind(), ErrorKind::HtmlPage);
        assert!(err.backend().is_none());
    }

    #[test]
    fn envelope_failure_under_200_uses_envelope_status() {
        let failure = BackendFailure {
            status_code: Some(401),
            ..BackendFailure::default()
        };
        let err = ApiError::from_envelope(StatusCode::OK, failure);
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.status_code(), 200);
    }
}
