use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::AUTHORIZATION;
use http::{HeaderValue, Request, Response};
use tower::{Layer, Service};

use crate::context::RequestContext;

/// Tower layer that attaches the session's bearer token.
///
/// On every call the [`RequestContext`] is asked for a token. When one is
/// present, `Authorization: Bearer <token>` replaces any existing value and
/// is marked sensitive; when none is present the header is left out.
#[derive(Clone)]
pub struct BearerAuthLayer {
    context: Arc<dyn RequestContext>,
}

impl BearerAuthLayer {
    #[must_use]
    pub fn new(context: Arc<dyn RequestContext>) -> Self {
        Self { context }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService {
            inner,
            context: Arc::clone(&self.context),
        }
    }
}

/// Created by [`BearerAuthLayer`].
#[derive(Clone)]
pub struct BearerAuthService<S> {
    inner: S,
    context: Arc<dyn RequestContext>,
}

impl<S> BearerAuthService<S> {
    fn bearer_value(&self) -> Option<HeaderValue> {
        let token = self.context.bearer_token().filter(|t| !t.is_empty())?;
        let raw = zeroize::Zeroizing::new(format!("Bearer {}", token.expose()));
        match HeaderValue::from_str(&raw) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(_) => {
                tracing::warn!("stored bearer token is not a valid header value; sending request without it");
                None
            }
        }
    }
}

impl<S, B, ResBody> Service<Request<B>> for BearerAuthService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        match self.bearer_value() {
            Some(value) => {
                req.headers_mut().insert(AUTHORIZATION, value);
            }
            None => {
                req.headers_mut().remove(AUTHORIZATION);
            }
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::context::{NoContext, StaticContext};
    use crate::layers::testing::{CaptureHeaders, request};
    use tower::ServiceExt;

    #[test]
    fn bearer_auth_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<BearerAuthLayer>();
        assert_traits::<BearerAuthService<CaptureHeaders>>();
    }

    #[tokio::test]
    async fn injects_authorization_when_token_stored() {
        let inner = CaptureHeaders::default();
        let ctx = Arc::new(StaticContext::default().with_token("tok-123"));
        let svc = BearerAuthLayer::new(ctx).layer(inner.clone());

        svc.oneshot(request()).await.unwrap();

        let headers = inner.headers();
        let value = headers.get(AUTHORIZATION).unwrap();
        assert_eq!(value, "Bearer tok-123");
        assert!(value.is_sensitive());
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let inner = CaptureHeaders::default();
        let svc = BearerAuthLayer::new(Arc::new(NoContext)).layer(inner.clone());

        svc.oneshot(request()).await.unwrap();
        assert!(inner.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn empty_token_counts_as_absent() {
        let inner = CaptureHeaders::default();
        let ctx = Arc::new(StaticContext::default().with_token(""));
        let svc = BearerAuthLayer::new(ctx).layer(inner.clone());

        svc.oneshot(request()).await.unwrap();
        assert!(inner.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn replaces_existing_authorization() {
        let inner = CaptureHeaders::default();
        let ctx = Arc::new(StaticContext::default().with_token("fresh"));
        let svc = BearerAuthLayer::new(ctx).layer(inner.clone());

        let mut req = request();
        req.headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer stale"));
        svc.oneshot(req).await.unwrap();

        let headers = inner.headers();
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer fresh");
    }

    #[tokio::test]
    async fn invalid_token_is_skipped() {
        let inner = CaptureHeaders::default();
        let ctx = Arc::new(StaticContext::default().with_token("bad\ntoken"));
        let svc = BearerAuthLayer::new(ctx).layer(inner.clone());

        svc.oneshot(request()).await.unwrap();
        assert!(inner.headers().get(AUTHORIZATION).is_none());
    }
}
