use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{Request, Response};
use tower::{Layer, Service};

use crate::api_error::ApiError;
use crate::error::HttpError;
use crate::response::{ResponseBody, content_type, parse_retry_after, read_body_limited};
use crate::security::{BODY_TOO_LARGE_PREVIEW, ERROR_BODY_PREVIEW_LIMIT};

/// Tower layer that reduces every failure to an [`ApiError`].
///
/// - transport, TLS and timeout errors become class `Network` (status 0)
/// - non-2xx responses are read up to a bounded preview, classified and
///   returned as `Err(HttpError::Api(..))`
/// - errors raised before the request left the client pass through
///
/// 2xx responses are forwarded untouched.
#[derive(Clone, Debug)]
pub struct ErrorNormalizeLayer {
    preview_limit: usize,
}

impl ErrorNormalizeLayer {
    /// `max_body_size` caps the preview further when it is below
    /// [`ERROR_BODY_PREVIEW_LIMIT`].
    #[must_use]
    pub fn new(max_body_size: usize) -> Self {
        Self {
            preview_limit: max_body_size.min(ERROR_BODY_PREVIEW_LIMIT),
        }
    }
}

impl<S> Layer<S> for ErrorNormalizeLayer {
    type Service = ErrorNormalizeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorNormalizeService {
            inner,
            preview_limit: self.preview_limit,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ErrorNormalizeService<S> {
    inner: S,
    preview_limit: usize,
}

impl<S, B> Service<Request<B>> for ErrorNormalizeService<S>
where
    S: Service<Request<B>, Response = Response<ResponseBody>, Error = HttpError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
    B: Send + 'static,
{
    type Response = Response<ResponseBody>;
    type Error = HttpError;
    type Future = Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(normalize_error)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let preview_limit = self.preview_limit;

        // Clone-swap pattern (Tower Service contract).
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let err = match inner.call(req).await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => normalize_response(resp, preview_limit).await,
                Err(err) => normalize_error(err),
            };

            if let HttpError::Api(api) = &err {
                let kind = api.kind();
                let status = api.status_code();
                if kind == bookstore_errors::ErrorKind::Network || status >= 500 {
                    tracing::warn!(%method, %path, %kind, status, error = %api, "backend call failed");
                } else {
                    tracing::debug!(%method, %path, %kind, status, "backend call rejected");
                }
            }
            Err(err)
        })
    }
}

/// Transport-level failures become `Network`; everything else is kept.
fn normalize_error(err: HttpError) -> HttpError {
    match err {
        HttpError::Transport(_) | HttpError::Tls(_) | HttpError::Timeout(_) => {
            ApiError::network(err).into()
        }
        other => other,
    }
}

async fn normalize_response(resp: Response<ResponseBody>, preview_limit: usize) -> HttpError {
    let status = resp.status();
    let content_type = content_type(resp.headers());
    let retry_after = parse_retry_after(resp.headers());

    let body_preview = match read_body_limited(resp, preview_limit).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(HttpError::BodyTooLarge { .. }) => BODY_TOO_LARGE_PREVIEW.to_owned(),
        // The connection dropped while the error body was streaming.
        Err(err) => return normalize_error(err),
    };

    ApiError::from_response(status, content_type, body_preview, retry_after).into()
}
