use crate::client::HttpClient;
use crate::envelope::Envelope;
use crate::error::{HttpError, InvalidUriKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Typed access to the backend REST API.
///
/// Joins endpoint paths onto a base URL, sends through the client's pipeline
/// and unwraps the response envelope. A `succeeded: false` envelope, a
/// non-2xx status and a transport failure all surface as
/// [`HttpError::Api`].
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: Url,
}

impl ApiClient {
    /// # Errors
    /// Returns `HttpError::InvalidUri` when `base_url` is not an absolute URL.
    pub fn new(http: HttpClient, base_url: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base_url).map_err(|e| HttpError::InvalidUri {
            url: base_url.to_owned(),
            kind: InvalidUriKind::ParseError,
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() || !base.has_host() {
            return Err(HttpError::InvalidUri {
                url: base_url.to_owned(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "base URL must be absolute".to_owned(),
            });
        }
        // Url::join drops the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base_url: base,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Absolute URL for an endpoint path such as `Account/Login`.
    ///
    /// The result always shares the base URL's origin, so the bearer token
    /// only ever goes to the configured backend.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidUri` if the path cannot be joined or points
    /// at another origin.
    pub fn url(&self, path: &str) -> Result<Url, HttpError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::InvalidUri {
                url: path.to_owned(),
                kind: InvalidUriKind::ParseError,
                reason: e.to_string(),
            })?;
        if url.origin() != self.base_url.origin() {
            return Err(HttpError::InvalidUri {
                url: path.to_owned(),
                kind: InvalidUriKind::ForeignOrigin,
                reason: format!("must stay on {}", self.base_url.origin().ascii_serialization()),
            });
        }
        Ok(url)
    }

    /// GET and unwrap `data`.
    ///
    /// # Errors
    /// See [`ApiClient`].
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        self.http.get(url.as_str()).send().await?.data().await
    }

    /// GET with query parameters and unwrap `data`.
    ///
    /// # Errors
    /// See [`ApiClient`].
    pub async fn get_data_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        self.http
            .get(url.as_str())
            .query(query)
            .send()
            .await?
            .data()
            .await
    }

    /// POST a JSON body and unwrap `data`.
    ///
    /// # Errors
    /// See [`ApiClient`].
    pub async fn post_data<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        self.http
            .post(url.as_str())
            .json(body)?
            .send()
            .await?
            .data()
            .await
    }

    /// POST a JSON body and return the full envelope.
    ///
    /// Used where the caller needs the envelope's `message` as well as the
    /// payload.
    ///
    /// # Errors
    /// See [`ApiClient`].
    pub async fn post_envelope<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        self.http
            .post(url.as_str())
            .json(body)?
            .send()
            .await?
            .envelope()
            .await
    }

    /// PUT a JSON body and unwrap `data`.
    ///
    /// # Errors
    /// See [`ApiClient`].
    pub async fn put_data<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "PUT");
        self.http
            .put(url.as_str())
            .json(body)?
            .send()
            .await?
            .data()
            .await
    }

    /// DELETE and unwrap `data`.
    ///
    /// # Errors
    /// See [`ApiClient`].
    pub async fn delete_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        let url = self.url(path)?;
        tracing::debug!(%url, "DELETE");
        self.http.delete(url.as_str()).send().await?.data().await
    }
}
