use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::Service;
use tower::buffer::Buffer;

/// Future type of the boxed service stack
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// Buffered service handle shared by all clones of a client
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client over the bookstore tower stack.
///
/// Every request goes through the same pipeline: bearer token, locale,
/// session id, user agent, timeout, decompression, then the network. On the
/// way back, the error layer turns transport errors and non-2xx statuses
/// into [`HttpError::Api`], so `send()` only ever yields 2xx responses.
///
/// `HttpClient` is `Clone + Send + Sync`; clones share one
/// `tower::buffer::Buffer` worker and need no external locking.
///
/// # Example
///
/// ```ignore
/// let client = HttpClient::builder()
///     .request_context(Arc::new(session_context))
///     .build()?;
///
/// let books: Vec<Book> = client
///     .get("https://api.bookstore.example/api/Books")
///     .send()
///     .await?
///     .data()
///     .await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    /// Client with default configuration and no request context
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    fn request(&self, method: http::Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.transport_security,
        )
    }

    /// GET request builder. `url` must be absolute.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::GET, url)
    }

    /// POST request builder.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::POST, url)
    }

    /// PUT request builder.
    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::PUT, url)
    }

    /// PATCH request builder.
    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::PATCH, url)
    }

    /// DELETE request builder.
    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(http::Method::DELETE, url)
    }

    /// Body size limit applied to responses from this client.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

/// Map buffer errors to `HttpError`
///
/// Errors from the inner stack arrive boxed and are unboxed; anything else
/// means the buffer worker is gone.
pub fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(
                error = %err,
                "buffer worker closed unexpectedly; service unavailable"
            );
            HttpError::ServiceClosed
        }
    }
}

/// Try to acquire a buffer slot without waiting.
///
/// A full buffer yields `HttpError::Overloaded` immediately.
pub async fn try_acquire_buffer_slot(service: &mut BufferedService) -> Result<(), HttpError> {
    use std::task::Poll;

    let poll_result = std::future::poll_fn(|cx| match service.poll_ready(cx) {
        Poll::Ready(result) => Poll::Ready(Some(result)),
        Poll::Pending => Poll::Ready(None),
    })
    .await;

    match poll_result {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(map_buffer_error(e)),
        None => Err(HttpError::Overloaded),
    }
}
