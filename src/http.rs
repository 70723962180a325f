//! Transport primitives for license and provisioning exchanges.
//!
//! The module exposes [`LicenseHttpClient`] and [`LicenseConnection`] so hosts can plug in
//! their own HTTP stack. The client asks the factory for a fresh connection on every
//! redirect hop, applies the merged request headers with
//! [`LicenseConnection::set_header`], and hands the connection over to
//! [`LicenseConnection::post`]. Because `post` consumes the connection, the transport
//! releases it on every exit path once the returned future resolves or is dropped.
//!
//! Implementations must not follow redirects on their own: 307/308 answers have to reach the
//! executor as plain [`HttpResponse`] values so it can apply its bounded redirect budget.

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Future returned by [`LicenseConnection::post`].
pub type ConnectionFuture<T> = Pin<Box<dyn Future<Output = T> + 'static + Send>>;

/// Connection factory used for every outbound license-server request.
///
/// Implementations must be `Send + Sync + 'static` so a single factory can be shared
/// between client clones and concurrent requests without additional wrappers.
pub trait LicenseHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;
	/// Single-use connection handed out per request hop.
	type Connection: LicenseConnection<Error = Self::TransportError>;

	/// Opens a new connection. Each redirect hop calls this again.
	fn open(&self) -> Self::Connection;
}

/// Single-use request/response primitive.
pub trait LicenseConnection
where
	Self: Send,
{
	/// Concrete error emitted by the connection.
	type Error: 'static + Send + Sync + StdError;

	/// Adds or replaces a request header for the upcoming exchange.
	fn set_header(&mut self, name: &str, value: &str);

	/// Issues the exchange as an HTTP `POST` and drains the full response body.
	///
	/// Non-2xx statuses are returned as [`HttpResponse`] values rather than errors; only
	/// connection-level failures resolve to `Err`.
	fn post(self, exchange: HttpExchange) -> ConnectionFuture<Result<HttpResponse, Self::Error>>;
}

/// A single POST exchange. There is no byte-range restriction and no other method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpExchange {
	/// Target URL.
	pub url: Url,
	/// Request body; `None` sends an empty body.
	pub body: Option<Vec<u8>>,
	/// Whether the server may answer with a gzip-encoded body.
	pub allow_gzip: bool,
}
impl HttpExchange {
	/// Creates a gzip-accepting exchange.
	pub fn new(url: Url, body: Option<Vec<u8>>) -> Self {
		Self { url, body, allow_gzip: true }
	}
}

/// Response captured by a [`LicenseConnection`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers in wire order.
	pub headers: ResponseHeaders,
	/// Fully drained response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for the redirect statuses that keep the POST method and body.
	pub fn is_method_preserving_redirect(&self) -> bool {
		matches!(self.status, 307 | 308)
	}
}

/// Multi-valued response header list with case-insensitive lookups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseHeaders(Vec<(String, String)>);
impl ResponseHeaders {
	/// Appends a header, keeping earlier values with the same name.
	pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.push((name.into(), value.into()));
	}

	/// Returns the first value recorded for `name`.
	pub fn first(&self, name: &str) -> Option<&str> {
		self.0.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
	}

	/// Iterates over every recorded header.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Number of recorded header lines.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no header was recorded.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K, V> FromIterator<(K, V)> for ResponseHeaders
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// License POSTs must not be redirected by the transport, because the executor follows
/// 307/308 answers itself under a fixed budget. Configure any custom [`ReqwestClient`] with
/// `redirect::Policy::none()` before passing it to [`ReqwestHttpClient::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client with redirects disabled and an optional whole-request timeout.
	pub fn build(timeout: Option<std::time::Duration>) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl LicenseHttpClient for ReqwestHttpClient {
	type Connection = ReqwestConnection;
	type TransportError = ReqwestError;

	fn open(&self) -> Self::Connection {
		ReqwestConnection { client: self.0.clone(), headers: Vec::new() }
	}
}

/// Connection handle returned by [`ReqwestHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Debug)]
pub struct ReqwestConnection {
	client: ReqwestClient,
	headers: Vec<(String, String)>,
}
#[cfg(feature = "reqwest")]
impl LicenseConnection for ReqwestConnection {
	type Error = ReqwestError;

	fn set_header(&mut self, name: &str, value: &str) {
		self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
		self.headers.push((name.to_owned(), value.to_owned()));
	}

	fn post(self, exchange: HttpExchange) -> ConnectionFuture<Result<HttpResponse, Self::Error>> {
		Box::pin(async move {
			let Self { client, headers } = self;
			let mut request = client.post(exchange.url);

			// Invalid names or values surface as a builder error from `send`.
			for (name, value) in &headers {
				request = request.header(name.as_str(), value.as_str());
			}
			if !exchange.allow_gzip {
				request = request.header(reqwest::header::ACCEPT_ENCODING, "identity");
			}

			let response = request.body(exchange.body.unwrap_or_default()).send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.map(|(name, value)| {
					(name.as_str().to_owned(), String::from_utf8_lossy(value.as_bytes()).into_owned())
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, headers, body })
		})
	}
}
