use crate::api_error::ApiError;
use crate::envelope::Envelope;
use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body::Frame;
use http_body_util::BodyExt;
use pin_project_lite::pin_project;
use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime};

/// Parse `Retry-After` header value into a `Duration`.
///
/// Supports delta-seconds ("120") and HTTP-date. Returns `None` when the
/// header is missing, unparseable, negative or already in the past.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?;
    let trimmed = value.trim();

    if let Ok(seconds) = trimmed.parse::<i64>() {
        if seconds < 0 {
            return None;
        }
        return Some(Duration::from_secs(seconds.cast_unsigned()));
    }

    let parsed = httpdate::parse_http_date(trimmed).ok()?;
    parsed.duration_since(SystemTime::now()).ok()
}

/// `Content-Type` header as an owned string.
pub(crate) fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Boxed response body (decompressed when the server used gzip/br/deflate).
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

pin_project! {
    /// Body wrapper that enforces size limits during streaming.
    ///
    /// Created by [`HttpResponse::into_limited_body()`]. Yields
    /// [`HttpError::BodyTooLarge`] once more than `limit` decompressed bytes
    /// have been read.
    pub struct LimitedBody {
        #[pin]
        inner: ResponseBody,
        limit: usize,
        read: usize,
    }
}

impl LimitedBody {
    #[must_use]
    pub fn new(inner: ResponseBody, limit: usize) -> Self {
        Self {
            inner,
            limit,
            read: 0,
        }
    }

    #[must_use]
    pub fn bytes_read(&self) -> usize {
        self.read
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl http_body::Body for LimitedBody {
    type Data = Bytes;
    type Error = HttpError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();

        match this.inner.poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    *this.read += data.len();
                    if *this.read > *this.limit {
                        return Poll::Ready(Some(Err(HttpError::BodyTooLarge {
                            limit: *this.limit,
                            actual: *this.read,
                        })));
                    }
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(HttpError::Transport(e)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Successful HTTP response.
///
/// The error layer turns every non-2xx status into `Err`, so a value of this
/// type always carries a 2xx status. Body reads enforce `max_body_size`.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    #[must_use]
    pub fn into_inner(self) -> Response<ResponseBody> {
        self.inner
    }

    /// Read the whole body.
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` if the body exceeds the limit.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_body_limited(self.inner, self.max_body_size).await
    }

    /// Parse the body as plain JSON, without envelope handling.
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` or `HttpError::Json`.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = self.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Read the body as UTF-8 text (lossy).
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` if the body exceeds the limit.
    pub async fn text(self) -> Result<String, HttpError> {
        let body = self.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Decode the backend envelope.
    ///
    /// An HTML document where JSON was expected (an SPA fallback page or a
    /// proxy error page served with 200) becomes an [`ApiError`] of class
    /// `HtmlPage` instead of a JSON error.
    ///
    /// # Errors
    /// Returns `HttpError::Api` for HTML bodies, `HttpError::Json` for other
    /// undecodable bodies, and `HttpError::BodyTooLarge`.
    pub async fn envelope<T: DeserializeOwned>(self) -> Result<Envelope<T>, HttpError> {
        let status = self.inner.status();
        let content_type = content_type(self.inner.headers());
        let body = self.bytes().await?;

        match Envelope::from_slice(&body) {
            Ok(envelope) => Ok(envelope),
            Err(err) if bookstore_errors::looks_like_html(content_type.as_deref(), &body) => {
                tracing::warn!(%status, error = %err, "expected JSON envelope, got an HTML page");
                let preview_len = body.len().min(crate::security::ERROR_BODY_PREVIEW_LIMIT);
                let preview = String::from_utf8_lossy(&body[..preview_len]).into_owned();
                Err(ApiError::html_page(status, content_type, preview).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Decode the envelope and return its `data`.
    ///
    /// # Errors
    /// A failure envelope becomes `HttpError::Api`; see also
    /// [`envelope`](Self::envelope).
    pub async fn data<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let status = self.inner.status();
        self.envelope::<T>()
            .await?
            .into_result()
            .map_err(|failure| ApiError::from_envelope(status, failure).into())
    }

    /// Body as a stream without any size limit.
    ///
    /// Prefer [`into_limited_body()`](Self::into_limited_body) for untrusted
    /// servers.
    #[must_use]
    pub fn into_body(self) -> ResponseBody {
        self.inner.into_body()
    }

    /// Body as a stream that fails once `max_body_size` is exceeded.
    #[must_use]
    pub fn into_limited_body(self) -> LimitedBody {
        LimitedBody::new(self.inner.into_body(), self.max_body_size)
    }

    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

/// Collect a body, failing with `BodyTooLarge` past `limit` decompressed bytes.
pub(crate) async fn read_body_limited(
    response: Response<ResponseBody>,
    limit: usize,
) -> Result<Bytes, HttpError> {
    let (_parts, body) = response.into_parts();

    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            if collected.len() + chunk.len() > limit {
                return Err(HttpError::BodyTooLarge {
                    limit,
                    actual: collected.len() + chunk.len(),
                });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
