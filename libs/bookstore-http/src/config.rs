use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("bookstore-http/", env!("CARGO_PKG_VERSION"));

/// TLS root certificate source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Mozilla root set compiled into the binary (default)
    #[default]
    WebPki,
    /// OS certificate store, loaded once and cached
    Native,
}

/// Transport security policy for outbound requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// Only `https://` URLs are accepted (default)
    #[default]
    TlsOnly,
    /// Plain `http://` is accepted as well. Debug builds and the
    /// `allow-insecure-http` feature only.
    AllowInsecureHttp,
}

/// HTTP client configuration
///
/// Every request is a single attempt; a timeout or transport failure is
/// reported to the caller as a network error and never replayed.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout (default: 30s)
    pub request_timeout: Duration,

    /// Maximum response body size in bytes (default: 10 MB)
    pub max_body_size: usize,

    /// User-Agent header value
    pub user_agent: String,

    /// Transport security policy
    pub transport: TransportSecurity,

    /// Root certificate source for TLS
    pub tls_roots: TlsRootConfig,

    /// Capacity of the request queue in front of the service stack.
    /// Values below 1 are clamped to 1.
    pub buffer_capacity: usize,

    /// Idle connection timeout. `None` keeps hyper-util's default.
    pub pool_idle_timeout: Option<Duration>,

    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024, // 10 MB
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            tls_roots: TlsRootConfig::default(),
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 8,
        }
    }
}

impl HttpClientConfig {
    /// Configuration for tests against local mock servers: plain HTTP
    /// allowed and a short timeout.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024, // 1 MB
            transport: TransportSecurity::AllowInsecureHttp,
            buffer_capacity: 64,
            pool_idle_timeout: Some(Duration::from_secs(10)),
            pool_max_idle_per_host: 4,
            ..Self::default()
        }
    }
}
