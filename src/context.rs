//! License request context and the deserializable client configuration.
//!
//! [`LicenseRequestContext`] carries the immutable per-client settings: which license URL
//! to fall back to, whether to force it, and how many manual redirects a single exchange may
//! follow. [`LicenseClientConfig`] is the serde-facing form hosts load from their own
//! configuration documents.

// std
use std::time::Duration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Manual redirects followed per exchange unless configured otherwise.
pub const MAX_MANUAL_REDIRECTS: u8 = 5;
/// Upper bound accepted for [`LicenseRequestContextBuilder::max_manual_redirects`].
pub const MAX_MANUAL_REDIRECTS_LIMIT: u8 = 20;

/// Errors raised while validating a [`LicenseRequestContext`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ContextError {
	/// Default license URL uses a scheme other than `http`/`https`.
	#[error("Default license URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Redirect budget exceeds the supported ceiling.
	#[error("Manual redirect budget {requested} exceeds the limit of {limit}.")]
	RedirectBudgetTooLarge {
		/// Requested budget.
		requested: u8,
		/// Supported ceiling.
		limit: u8,
	},
}

/// Immutable settings that decide where key requests are sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LicenseRequestContext {
	default_license_url: Url,
	force_default_license_url: bool,
	max_manual_redirects: u8,
}
impl LicenseRequestContext {
	/// Creates a context that only falls back to `default_license_url` when a key request
	/// carries no URL of its own.
	pub fn new(default_license_url: &str) -> Result<Self> {
		Self::builder(default_license_url).build()
	}

	/// Starts a builder seeded with the default license URL.
	pub fn builder(default_license_url: impl Into<String>) -> LicenseRequestContextBuilder {
		LicenseRequestContextBuilder::new(default_license_url)
	}

	/// Default license URL.
	pub fn default_license_url(&self) -> &Url {
		&self.default_license_url
	}

	/// Whether the default URL overrides URLs embedded in key requests.
	pub fn force_default_license_url(&self) -> bool {
		self.force_default_license_url
	}

	/// Manual redirect budget per exchange.
	pub fn max_manual_redirects(&self) -> u8 {
		self.max_manual_redirects
	}

	/// Picks the URL a key request is sent to.
	///
	/// The default URL wins when forced, or when the request URL is absent or empty.
	pub fn effective_license_url<'a>(&'a self, per_request: Option<&'a str>) -> &'a str {
		match per_request {
			Some(url) if !self.force_default_license_url && !url.is_empty() => url,
			_ => self.default_license_url.as_str(),
		}
	}
}

/// Builder for [`LicenseRequestContext`] values.
#[derive(Debug)]
pub struct LicenseRequestContextBuilder {
	/// Default license URL text, validated on [`build`](Self::build).
	pub default_license_url: String,
	/// Force flag.
	pub force_default_license_url: bool,
	/// Manual redirect budget.
	pub max_manual_redirects: u8,
}
impl LicenseRequestContextBuilder {
	/// Creates a new builder seeded with the provided URL.
	pub fn new(default_license_url: impl Into<String>) -> Self {
		Self {
			default_license_url: default_license_url.into(),
			force_default_license_url: false,
			max_manual_redirects: MAX_MANUAL_REDIRECTS,
		}
	}

	/// Routes every key request to the default URL.
	pub fn force_default_license_url(mut self, force: bool) -> Self {
		self.force_default_license_url = force;

		self
	}

	/// Overrides the manual redirect budget (defaults to 5, `0` disables redirects).
	pub fn max_manual_redirects(mut self, max: u8) -> Self {
		self.max_manual_redirects = max;

		self
	}

	/// Validates the settings and produces the context.
	pub fn build(self) -> Result<LicenseRequestContext> {
		let url = Url::parse(&self.default_license_url)
			.map_err(|source| ConfigError::invalid_url(&self.default_license_url, source))?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::from(ContextError::UnsupportedScheme {
				url: self.default_license_url,
			})
			.into());
		}
		if self.max_manual_redirects > MAX_MANUAL_REDIRECTS_LIMIT {
			return Err(ConfigError::from(ContextError::RedirectBudgetTooLarge {
				requested: self.max_manual_redirects,
				limit: MAX_MANUAL_REDIRECTS_LIMIT,
			})
			.into());
		}

		Ok(LicenseRequestContext {
			default_license_url: url,
			force_default_license_url: self.force_default_license_url,
			max_manual_redirects: self.max_manual_redirects,
		})
	}
}

/// Host-facing configuration document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseClientConfig {
	/// Default license URL.
	pub default_license_url: String,
	/// Route every key request to the default URL.
	#[serde(default)]
	pub force_default_license_url: bool,
	/// Manual redirect budget per exchange.
	#[serde(default = "default_max_manual_redirects")]
	pub max_manual_redirects: u8,
	/// Whole-request timeout for the bundled transport, in milliseconds.
	#[serde(default)]
	pub request_timeout_ms: Option<u64>,
	/// Key-request headers seeded into the shared header store.
	#[serde(default)]
	pub headers: BTreeMap<String, String>,
}
impl LicenseClientConfig {
	/// Parses a JSON configuration document, reporting the offending field path on failure.
	pub fn from_json_str(raw: &str) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let config = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::Parse { source })?;

		de.end().map_err(|source| ConfigError::TrailingData { source })?;

		Ok(config)
	}

	/// Validates the URL settings into a [`LicenseRequestContext`].
	pub fn context(&self) -> Result<LicenseRequestContext> {
		LicenseRequestContext::builder(self.default_license_url.as_str())
			.force_default_license_url(self.force_default_license_url)
			.max_manual_redirects(self.max_manual_redirects)
			.build()
	}

	/// Request timeout as a [`Duration`].
	pub fn request_timeout(&self) -> Option<Duration> {
		self.request_timeout_ms.map(Duration::from_millis)
	}
}

fn default_max_manual_redirects() -> u8 {
	MAX_MANUAL_REDIRECTS
}
