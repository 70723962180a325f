//! Client-level error types shared by the request builder, executor, and header store.

// self
use crate::{_prelude::*, http::ResponseHeaders};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Every failure is surfaced as a distinct variant so hosts can tell an empty license apart
/// from a failed exchange.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout, malformed response).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Payload could not be encoded or decoded.
	#[error(transparent)]
	Encoding(#[from] EncodingError),

	/// Header store mutation received an unusable name or value.
	#[error("Invalid {argument}: {reason}.")]
	InvalidArgument {
		/// Which argument was rejected.
		argument: &'static str,
		/// Why the argument was rejected.
		reason: &'static str,
	},
	/// The server kept redirecting after the manual redirect budget was spent.
	#[error("License server at {url} answered {status} after {max_redirects} manual redirects.")]
	RedirectExhausted {
		/// Manual redirect budget that was exhausted.
		max_redirects: u8,
		/// Redirect status (307 or 308) of the last response.
		status: u16,
		/// URL that produced the last redirect.
		url: String,
	},
	/// Non-2xx response that is not eligible for manual redirect handling.
	#[error("License server at {url} answered with HTTP status {status}.")]
	HttpStatus {
		/// HTTP status code.
		status: u16,
		/// URL that produced the response.
		url: String,
		/// Response headers, kept for diagnosis.
		headers: ResponseHeaders,
		/// Response body, kept for diagnosis.
		body: Vec<u8>,
	},
}
impl Error {
	pub(crate) fn invalid_argument(argument: &'static str, reason: &'static str) -> Self {
		Self::InvalidArgument { argument, reason }
	}

	/// Returns the HTTP status carried by the error, if the server answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::RedirectExhausted { status, .. } | Self::HttpStatus { status, .. } =>
				Some(*status),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A license or provisioning URL cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL text.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request context failed validation.
	#[error(transparent)]
	InvalidContext(#[from] crate::context::ContextError),
	/// Configuration document could not be deserialized.
	#[error("Client configuration is malformed.")]
	Parse {
		/// Structured parsing failure pointing at the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Configuration document is followed by something other than whitespace.
	#[error("Client configuration has trailing data.")]
	TrailingData {
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
		Self::InvalidUrl { url: url.into(), source }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, malformed responses).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the license server.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Redirect response carried a `Location` that is not a usable URL.
	#[error("License server redirected to an invalid location `{location}`.")]
	InvalidRedirect {
		/// Raw `Location` header value.
		location: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Payload encoding failures.
#[derive(Debug, ThisError)]
pub enum EncodingError {
	/// Provisioning request data is not valid UTF-8.
	#[error("Provisioning request data is not valid UTF-8.")]
	ProvisionData {
		/// Underlying decoding failure.
		#[source]
		source: std::str::Utf8Error,
	},
	/// License request envelope could not be serialized.
	#[error("License request envelope could not be serialized.")]
	Json(#[from] serde_json::Error),
}
