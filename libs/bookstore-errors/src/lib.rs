//! Error taxonomy for the bookstore storefront client
//!
//! This crate holds pure data, with no dependency on the HTTP client:
//! - [`ErrorKind`]: the failure classes every backend call collapses into
//! - [`catalog`]: one fixed, user-facing Arabic message per class
//! - [`BackendCode`]: the stable code → message table for backend
//!   validation failures
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod backend;
pub mod catalog;
pub mod kind;

pub use backend::BackendCode;
pub use catalog::{MessageDef, message_for};
pub use kind::{ErrorKind, looks_like_html};
