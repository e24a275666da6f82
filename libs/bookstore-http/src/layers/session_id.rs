use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::HeaderName;
use http::{HeaderValue, Request, Response};
use tower::{Layer, Service};

use crate::context::{RequestContext, SESSION_ID_HEADER};

/// Tower layer that forwards the stored session-correlation id as
/// `X-Session-Id`. Absent id, absent header.
#[derive(Clone)]
pub struct SessionIdLayer {
    context: Arc<dyn RequestContext>,
}

impl SessionIdLayer {
    #[must_use]
    pub fn new(context: Arc<dyn RequestContext>) -> Self {
        Self { context }
    }
}

impl<S> Layer<S> for SessionIdLayer {
    type Service = SessionIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionIdService {
            inner,
            context: Arc::clone(&self.context),
        }
    }
}

#[derive(Clone)]
pub struct SessionIdService<S> {
    inner: S,
    context: Arc<dyn RequestContext>,
}

impl<S, B, ResBody> Service<Request<B>> for SessionIdService<S>
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
        let name = HeaderName::from_static(SESSION_ID_HEADER);
        let id = self.context.session_id().filter(|id| !id.is_empty());
        match id.map(|id| HeaderValue::from_str(&id)) {
            Some(Ok(value)) => {
                req.headers_mut().insert(name, value);
            }
            Some(Err(_)) => {
                tracing::warn!("stored session id is not a valid header value; omitting it");
            }
            None => {}
        }
        self.inner.call(req)
    }
}
