#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP client and request pipeline for the bookstore backend
//!
//! This crate provides a hyper-based HTTP client whose tower stack carries the
//! storefront's cross-cutting request behavior:
//! - `Authorization: Bearer <token>` when the session holds a token
//! - `Accept-Language` from the stored locale (default `ar`)
//! - `X-Session-Id` when a correlation id is stored
//! - Error normalization: every failure collapses into an [`ApiError`] carrying
//!   one fixed, user-facing message per failure class
//! - Envelope decoding: backend payloads are checked once against the
//!   `{ data, message, succeeded, statusCode, errors }` schema
//!
//! Each call is a single attempt; nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! use bookstore_http::{ApiClient, HttpClient};
//! use std::sync::Arc;
//!
//! let http = HttpClient::builder()
//!     .request_context(Arc::new(session_context))
//!     .build()?;
//! let api = ApiClient::new(http, "https://api.bookstore.example/api/")?;
//!
//! let books: Vec<Book> = api.get_data("Books").await?;
//! ```

mod api;
mod api_error;
mod builder;
mod client;
mod config;
mod context;
mod envelope;
mod error;
mod layers;
mod request;
mod response;
mod secret;
pub mod security;
mod tls;

pub use api::ApiClient;
pub use api_error::{ApiError, ApiErrorOrigin};
pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig, TransportSecurity};
pub use context::{
    DEFAULT_LOCALE, NoContext, RequestContext, SESSION_ID_HEADER, StaticContext,
};
pub use envelope::{BackendFailure, Envelope, FieldError};
pub use error::{HttpError, InvalidUriKind};
pub use layers::{
    BearerAuthLayer, BearerAuthService, ErrorNormalizeLayer, ErrorNormalizeService, LocaleLayer,
    LocaleService, SessionIdLayer, SessionIdService, UserAgentLayer, UserAgentService,
};
pub use request::RequestBuilder;
pub use response::{HttpResponse, LimitedBody, ResponseBody};
pub use secret::SecretString;
