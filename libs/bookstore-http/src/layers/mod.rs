//! Tower layers for the bookstore request pipeline
//!
//! Composed by [`HttpClientBuilder::build`](crate::HttpClientBuilder::build)
//! in a fixed order (outer → inner):
//!
//! - [`ErrorNormalizeLayer`] - turns transport errors and non-2xx responses into [`ApiError`](crate::ApiError)
//! - [`BearerAuthLayer`] - `Authorization: Bearer <token>` when signed in
//! - [`LocaleLayer`] - `Accept-Language` from the stored locale
//! - [`SessionIdLayer`] - `X-Session-Id` when a correlation id is stored
//! - [`UserAgentLayer`] - default `User-Agent`

mod bearer;
mod locale;
mod normalize;
mod session_id;
mod user_agent;

pub use bearer::{BearerAuthLayer, BearerAuthService};
pub use locale::{LocaleLayer, LocaleService};
pub use normalize::{ErrorNormalizeLayer, ErrorNormalizeService};
pub use session_id::{SessionIdLayer, SessionIdService};
pub use user_agent::{UserAgentLayer, UserAgentService};
