//! Static catalog of user-facing messages, one per [`ErrorKind`].
#![allow(clippy::non_ascii_literal)]

use crate::kind::ErrorKind;

/// Static message definition from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDef {
    pub kind: ErrorKind,
    /// Representative status; `0` for network failures and `None` when the
    /// class spans several statuses.
    pub status: Option<u16>,
    pub code: &'static str,
    pub message: &'static str,
}

pub const NETWORK: MessageDef = MessageDef {
    kind: ErrorKind::Network,
    status: Some(0),
    code: "NETWORK_UNREACHABLE",
    message: "لا يمكن الاتصال بالخادم. تأكد من اتصالك بالإنترنت",
};

pub const VALIDATION: MessageDef = MessageDef {
    kind: ErrorKind::Validation,
    status: Some(400),
    code: "BAD_REQUEST",
    message: "البيانات المدخلة غير صحيحة. يرجى مراجعتها والمحاولة مرة أخرى",
};

pub const UNAUTHENTICATED: MessageDef = MessageDef {
    kind: ErrorKind::Unauthenticated,
    status: Some(401),
    code: "UNAUTHENTICATED",
    message: "انتهت صلاحية الجلسة. يرجى تسجيل الدخول مرة أخرى",
};

pub const FORBIDDEN: MessageDef = MessageDef {
    kind: ErrorKind::Forbidden,
    status: Some(403),
    code: "FORBIDDEN",
    message: "ليس لديك صلاحية للقيام بهذا الإجراء",
};

pub const NOT_FOUND: MessageDef = MessageDef {
    kind: ErrorKind::NotFound,
    status: Some(404),
    code: "NOT_FOUND",
    message: "العنصر المطلوب غير موجود",
};

pub const RATE_LIMITED: MessageDef = MessageDef {
    kind: ErrorKind::RateLimited,
    status: Some(429),
    code: "RATE_LIMITED",
    message: "طلبات كثيرة جداً. يرجى الانتظار قليلاً ثم المحاولة مرة أخرى",
};

pub const SERVER: MessageDef = MessageDef {
    kind: ErrorKind::Server,
    status: None,
    code: "SERVER_ERROR",
    message: "حدث خطأ في الخادم. يرجى المحاولة لاحقاً",
};

pub const HTML_PAGE: MessageDef = MessageDef {
    kind: ErrorKind::HtmlPage,
    status: None,
    code: "UNEXPECTED_HTML",
    message: "استجابة غير متوقعة من الخادم. يرجى المحاولة لاحقاً",
};

pub const UNEXPECTED: MessageDef = MessageDef {
    kind: ErrorKind::Unexpected,
    status: None,
    code: "UNEXPECTED",
    message: "حدث خطأ غير متوقع. يرجى المحاولة مرة أخرى",
};

/// Every catalog entry, in classification order.
pub const ALL: [MessageDef; 9] = [
    NETWORK,
    VALIDATION,
    UNAUTHENTICATED,
    FORBIDDEN,
    NOT_FOUND,
    RATE_LIMITED,
    SERVER,
    HTML_PAGE,
    UNEXPECTED,
];

/// Look up the catalog entry for a class.
#[must_use]
pub fn message_for(kind: ErrorKind) -> &'static MessageDef {
    match kind {
        ErrorKind::Network => &NETWORK,
        ErrorKind::Validation => &VALIDATION,
        ErrorKind::Unauthenticated => &UNAUTHENTICATED,
        ErrorKind::Forbidden => &FORBIDDEN,
        ErrorKind::NotFound => &NOT_FOUND,
        ErrorKind::RateLimited => &RATE_LIMITED,
        ErrorKind::Server => &SERVER,
        ErrorKind::HtmlPage => &HTML_PAGE,
        ErrorKind::Unexpected => &UNEXPECTED,
    }
}
