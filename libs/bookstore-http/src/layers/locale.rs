use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::ACCEPT_LANGUAGE;
use http::{HeaderValue, Request, Response};
use tower::{Layer, Service};

use crate::context::{DEFAULT_LOCALE, RequestContext};

/// Tower layer that sets `Accept-Language` from the stored locale.
///
/// Falls back to [`DEFAULT_LOCALE`] when nothing is stored or the stored tag
/// is not a valid header value.
#[derive(Clone)]
pub struct LocaleLayer {
    context: Arc<dyn RequestContext>,
}

impl LocaleLayer {
    #[must_use]
    pub fn new(context: Arc<dyn RequestContext>) -> Self {
        Self { context }
    }
}

impl<S> Layer<S> for LocaleLayer {
    type Service = LocaleService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LocaleService {
            inner,
            context: Arc::clone(&self.context),
        }
    }
}

#[derive(Clone)]
pub struct LocaleService<S> {
    inner: S,
    context: Arc<dyn RequestContext>,
}

impl<S> LocaleService<S> {
    fn language(&self) -> HeaderValue {
        let stored = self
            .context
            .locale()
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty());

        if let Some(tag) = stored {
            match HeaderValue::from_str(&tag) {
                Ok(value) => return value,
                Err(_) => tracing::warn!(locale = %tag.escape_default(), "invalid stored locale; using default"),
            }
        }
        HeaderValue::from_static(DEFAULT_LOCALE)
    }
}

impl<S, B, ResBody> Service<Request<B>> for LocaleService<S>
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
        let value = self.language();
        req.headers_mut().insert(ACCEPT_LANGUAGE, value);
        self.inner.call(req)
    }
}
