//! Backend response envelope.
//!
//! Every endpoint answers with the same wrapper:
//!
//! ```json
//! { "data": ..., "message": "...", "succeeded": true, "statusCode": 200, "errors": [...] }
//! ```
//!
//! The wrapper is checked once, here, and turned into an [`Envelope`]; code
//! past this point never inspects raw JSON.

use bookstore_errors::{BackendCode, ErrorKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decoded backend envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success { data: T, message: Option<String> },
    Failure(BackendFailure),
}

/// One entry of the envelope's `errors` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Set when the backend keyed its errors by field name.
    pub field: Option<String>,
    pub message: String,
}

/// The failure half of an envelope, also parsed out of non-2xx bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFailure {
    pub message: Option<String>,
    /// Machine-readable error code, when the backend sends one.
    pub code: Option<String>,
    pub status_code: Option<u16>,
    pub errors: Vec<FieldError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    succeeded: Option<bool>,
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    errors: Option<RawErrors>,
    #[serde(default, alias = "errorCode")]
    code: Option<String>,
    // ASP.NET problem details use `title` for the summary line.
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawErrors {
    List(Vec<String>),
    Map(BTreeMap<String, Vec<String>>),
    Single(String),
}

impl RawErrors {
    fn flatten(self) -> Vec<FieldError> {
        match self {
            RawErrors::List(items) => items
                .into_iter()
                .map(|message| FieldError {
                    field: None,
                    message,
                })
                .collect(),
            RawErrors::Map(map) => map
                .into_iter()
                .flat_map(|(field, messages)| {
                    messages.into_iter().map(move |message| FieldError {
                        field: Some(field.clone()),
                        message,
                    })
                })
                .collect(),
            RawErrors::Single(message) => vec![FieldError {
                field: None,
                message,
            }],
        }
    }
}

impl RawEnvelope {
    fn is_failure(&self) -> bool {
        match self.succeeded {
            Some(ok) => !ok,
            None => self.status_code.is_some_and(|s| s >= 400),
        }
    }

    fn into_failure(self) -> BackendFailure {
        BackendFailure {
            message: self.message.or(self.title),
            code: self.code,
            status_code: self.status_code,
            errors: self.errors.map(RawErrors::flatten).unwrap_or_default(),
        }
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode an envelope from a 2xx response body.
    ///
    /// An empty body (`204 No Content`) is a success whose `data` is decoded
    /// from `null`.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` when the body is not an envelope or when
    /// `data` does not match `T`.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Envelope::Success {
                data: serde_json::from_value(serde_json::Value::Null)?,
                message: None,
            });
        }
        let raw: RawEnvelope = serde_json::from_slice(body)?;
        if raw.is_failure() {
            return Ok(Envelope::Failure(raw.into_failure()));
        }
        let data = serde_json::from_value(raw.data)?;
        Ok(Envelope::Success {
            data,
            message: raw.message,
        })
    }
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    /// Payload of a successful envelope.
    ///
    /// # Errors
    ///
    /// Returns the backend failure otherwise.
    pub fn into_result(self) -> Result<T, BackendFailure> {
        match self {
            Envelope::Success { data, .. } => Ok(data),
            Envelope::Failure(failure) => Err(failure),
        }
    }
}

impl BackendFailure {
    /// Lenient parse of an error body.
    ///
    /// Accepts a full envelope, a bare `{ "message": ... }` object, problem
    /// details, or a JSON string. Returns `None` for anything else.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Option<Self> {
        if let Ok(raw) = serde_json::from_slice::<RawEnvelope>(body) {
            let failure = raw.into_failure();
            return (!failure.is_empty()).then_some(failure);
        }
        match serde_json::from_slice::<String>(body) {
            Ok(message) if !message.trim().is_empty() => Some(Self {
                message: Some(message),
                ..Self::default()
            }),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        self.message.is_none() && self.code.is_none() && self.errors.is_empty()
    }

    /// Known backend code carried by this failure.
    ///
    /// The explicit `code` wins; the summary message and then each error
    /// entry are matched against the known legacy texts.
    #[must_use]
    pub fn backend_code(&self) -> Option<BackendCode> {
        BackendCode::resolve(self.code.as_deref(), self.message.as_deref()).or_else(|| {
            self.errors
                .iter()
                .find_map(|e| BackendCode::from_legacy_text(&e.message))
        })
    }

    /// Class implied by the envelope's own `statusCode`.
    ///
    /// Used when a failure envelope arrives under a 2xx transport status.
    #[must_use]
    pub fn kind_hint(&self) -> ErrorKind {
        match self.status_code {
            Some(status) if status >= 400 => ErrorKind::classify(status, false),
            _ => ErrorKind::Validation,
        }
    }

    /// Summary message, or the first error entry when there is none.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or_else(|| self.errors.first().map(|e| e.message.as_str()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Book {
        id: u32,
        title: String,
    }

    fn bytes(v: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(v).unwrap()
    }

    #[test]
    fn success_envelope_unwraps_data() {
        let body = bytes(&json!({
            "data": [{"id": 1, "title": "Dune"}],
            "message": "ok",
            "succeeded": true,
            "statusCode": 200,
            "errors": null
        }));

        let env: Envelope<Vec<Book>> = Envelope::from_slice(&body).unwrap();
        assert_eq!(
            env,
            Envelope::Success {
                data: vec![Book {
                    id: 1,
                    title: "Dune".into()
                }],
                message: Some("ok".into()),
            }
        );
    }

    #[test]
    fn succeeded_false_is_failure_even_with_data() {
        let body = bytes(&json!({
            "data": null,
            "message": "Email is already registered",
            "succeeded": false,
            "statusCode": 400
        }));

        let env: Envelope<Book> = Envelope::from_slice(&body).unwrap();
        let failure = env.into_result().unwrap_err();
        assert_eq!(failure.status_code, Some(400));
        assert_eq!(failure.backend_code(), Some(BackendCode::EmailTaken));
        assert_eq!(failure.kind_hint(), ErrorKind::Validation);
    }

    #[test]
    fn missing_succeeded_falls_back_to_status_code() {
        let body = bytes(&json!({ "statusCode": 404, "message": "User not found" }));
        let env: Envelope<serde_json::Value> = Envelope::from_slice(&body).unwrap();
        let failure = env.into_result().unwrap_err();
        assert_eq!(failure.kind_hint(), ErrorKind::NotFound);
        assert_eq!(failure.backend_code(), Some(BackendCode::UserNotFound));
    }

    #[test]
    fn unit_payload_accepts_missing_data() {
        let body = bytes(&json!({ "succeeded": true, "message": "deleted" }));
        let env: Envelope<()> = Envelope::from_slice(&body).unwrap();
        assert!(env.is_success());
    }

    #[test]
    fn empty_body_is_success_with_null_data() {
        let env: Envelope<()> = Envelope::from_slice(b"").unwrap();
        assert_eq!(
            env,
            Envelope::Success {
                data: (),
                message: None
            }
        );
        let env: Envelope<Option<Book>> = Envelope::from_slice(b" \n").unwrap();
        assert!(matches!(env, Envelope::Success { data: None, .. }));
        assert!(Envelope::<Book>::from_slice(b"").is_err());
    }

    #[test]
    fn data_shape_mismatch_is_a_json_error() {
        let body = bytes(&json!({ "succeeded": true, "data": "not a book" }));
        assert!(Envelope::<Book>::from_slice(&body).is_err());
    }

    #[test]
    fn error_map_is_flattened_per_field() {
        let body = bytes(&json!({
            "title": "One or more validation errors occurred.",
            "status": 400,
            "errors": {
                "Email": ["The Email field is required."],
                "Password": ["Password is too weak", "Too short"]
            }
        }));

        let failure = BackendFailure::from_body(&body).unwrap();
        assert_eq!(
            failure.message.as_deref(),
            Some("One or more validation errors occurred.")
        );
        assert_eq!(failure.errors.len(), 3);
        assert_eq!(failure.errors[0].field.as_deref(), Some("Email"));
        assert_eq!(failure.backend_code(), Some(BackendCode::WeakPassword));
    }

    #[test]
    fn explicit_code_beats_message_text() {
        let body = bytes(&json!({
            "code": "USERNAME_TAKEN",
            "message": "Email is already registered"
        }));
        let failure = BackendFailure::from_body(&body).unwrap();
        assert_eq!(failure.backend_code(), Some(BackendCode::UsernameTaken));
    }

    #[test]
    fn bare_json_string_body_is_accepted() {
        let failure = BackendFailure::from_body(br#""Username is already taken""#).unwrap();
        assert_eq!(failure.backend_code(), Some(BackendCode::UsernameTaken));
    }

    #[test]
    fn non_json_and_empty_bodies_yield_nothing() {
        assert!(BackendFailure::from_body(b"<html>oops</html>").is_none());
        assert!(BackendFailure::from_body(b"").is_none());
        assert!(BackendFailure::from_body(b"{}").is_none());
    }

    #[test]
    fn first_message_prefers_summary() {
        let failure = BackendFailure {
            message: None,
            errors: vec![FieldError {
                field: None,
                message: "first".into(),
            }],
            ..BackendFailure::default()
        };
        assert_eq!(failure.first_message(), Some("first"));
    }
}
