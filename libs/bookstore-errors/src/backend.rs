//! Stable table of backend failure codes and their localized messages.
//!
//! The backend's failure envelope may carry a machine-readable `code`. That
//! code is the key. Older backend builds only send free text in `message`;
//! [`BackendCode::from_legacy_text`] recognizes the handful of texts they
//! are known to emit and maps them onto the same codes.
#![allow(clippy::non_ascii_literal)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum BackendCode {
    UsernameTaken,
    EmailTaken,
    InvalidCredentials,
    PasswordMismatch,
    WeakPassword,
    UserNotFound,
}

const ALL: [BackendCode; 6] = [
    BackendCode::UsernameTaken,
    BackendCode::EmailTaken,
    BackendCode::InvalidCredentials,
    BackendCode::PasswordMismatch,
    BackendCode::WeakPassword,
    BackendCode::UserNotFound,
];

impl BackendCode {
    /// Parse the envelope's `code` field. Case-insensitive.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        ALL.into_iter()
            .find(|c| c.wire_code().eq_ignore_ascii_case(code))
    }

    /// Recognize a known legacy backend text.
    ///
    /// Matching is exact after trimming and ignoring ASCII case and a
    /// trailing period; anything else is `None`.
    #[must_use]
    pub fn from_legacy_text(text: &str) -> Option<Self> {
        let text = text.trim().trim_end_matches('.');
        ALL.into_iter()
            .find(|c| c.legacy_text().eq_ignore_ascii_case(text))
    }

    /// Resolve from an optional code, falling back to the legacy text.
    #[must_use]
    pub fn resolve(code: Option<&str>, text: Option<&str>) -> Option<Self> {
        code.and_then(Self::from_code)
            .or_else(|| text.and_then(Self::from_legacy_text))
    }

    #[must_use]
    pub fn wire_code(self) -> &'static str {
        match self {
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::UserNotFound => "USER_NOT_FOUND",
        }
    }

    /// Text older backend builds send in `message` instead of a code.
    #[must_use]
    pub fn legacy_text(self) -> &'static str {
        match self {
            Self::UsernameTaken => "Username is already taken",
            Self::EmailTaken => "Email is already registered",
            Self::InvalidCredentials => "Invalid email or password",
            Self::PasswordMismatch => "Passwords do not match",
            Self::WeakPassword => "Password is too weak",
            Self::UserNotFound => "User not found",
        }
    }

    /// Localized (Arabic) message for this code.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::UsernameTaken => "اسم المستخدم موجود بالفعل",
            Self::EmailTaken => "البريد الإلكتروني مسجل بالفعل",
            Self::InvalidCredentials => "البريد الإلكتروني أو كلمة المرور غير صحيحة",
            Self::PasswordMismatch => "كلمتا المرور غير متطابقتين",
            Self::WeakPassword => "كلمة المرور ضعيفة",
            Self::UserNotFound => "المستخدم غير موجود",
        }
    }
}
