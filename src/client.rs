//! Host-facing license client.
//!
//! [`LicenseClient`] ties the request builder, the shared header store, the session
//! credentials, and the redirect-aware executor together. Hosts call it from whatever task
//! services the protection module's key and provisioning requests; every call builds its own
//! connection chain and redirect counter, so concurrent requests never share per-call state.

// self
use crate::{
	_prelude::*,
	context::{LicenseClientConfig, LicenseRequestContext},
	credentials::{CredentialsSlot, DrmToken, SessionCredentials},
	executor::{self, ExecuteOptions, LicenseResponse},
	headers::KeyRequestHeaders,
	http::LicenseHttpClient,
	obs::{self, RequestKind, RequestMetrics, RequestSpan},
	request::{self, KeyRequest, ProvisionRequest, RequestHeaders},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestLicenseClient = LicenseClient<ReqwestHttpClient>;

/// Obtains licenses and device certificates on behalf of a content-protection module.
///
/// Clones share the header store, the session credentials, and the request counters.
pub struct LicenseClient<C>
where
	C: ?Sized + LicenseHttpClient,
{
	/// Connection factory used for every outbound request.
	pub http_client: Arc<C>,
	/// Shared per-client request counters.
	pub metrics: Arc<RequestMetrics>,
	context: LicenseRequestContext,
	headers: KeyRequestHeaders,
	credentials: CredentialsSlot,
}
impl<C> LicenseClient<C>
where
	C: ?Sized + LicenseHttpClient,
{
	/// Creates a client that reuses the caller-provided connection factory.
	pub fn with_http_client(
		context: LicenseRequestContext,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			metrics: Default::default(),
			context,
			headers: Default::default(),
			credentials: Default::default(),
		}
	}

	/// Immutable request context.
	pub fn context(&self) -> &LicenseRequestContext {
		&self.context
	}

	/// Shared key-request header store.
	pub fn headers(&self) -> &KeyRequestHeaders {
		&self.headers
	}

	/// Adds or replaces a header sent with every key request.
	pub fn set_header(&self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<()> {
		self.headers.set(name, value)
	}

	/// Removes a key-request header.
	pub fn clear_header(&self, name: impl AsRef<str>) -> Result<()> {
		self.headers.clear(name).map(|_| ())
	}

	/// Removes every key-request header.
	pub fn clear_all_headers(&self) {
		self.headers.clear_all();
	}

	/// Sets the session token used by subsequent key requests.
	pub fn set_token(&self, token: impl Into<String>) {
		self.credentials.set_token(DrmToken::new(token));
	}

	/// Sets the key id used by subsequent key requests.
	pub fn set_key_id(&self, key_id: impl Into<String>) {
		self.credentials.set_key_id(key_id.into());
	}

	/// Replaces token and key id in one step.
	pub fn set_credentials(&self, credentials: SessionCredentials) {
		self.credentials.set(credentials);
	}

	/// Forgets the stored token and key id.
	pub fn clear_credentials(&self) {
		self.credentials.set(SessionCredentials::default());
	}

	/// Returns a copy of the stored token and key id.
	pub fn credentials(&self) -> SessionCredentials {
		self.credentials.snapshot()
	}

	/// Shared request counters.
	pub fn metrics(&self) -> &RequestMetrics {
		&self.metrics
	}

	/// Requests a license using the stored session credentials.
	///
	/// Token and key id are read together once, before the request is built.
	pub async fn execute_key_request(&self, request: &KeyRequest) -> Result<LicenseResponse> {
		let credentials = self.credentials.snapshot();

		self.execute_key_request_with(request, &credentials).await
	}

	/// Requests a license using explicit credentials, ignoring the stored ones.
	pub async fn execute_key_request_with(
		&self,
		request: &KeyRequest,
		credentials: &SessionCredentials,
	) -> Result<LicenseResponse> {
		const KIND: RequestKind = RequestKind::Key;

		let span = RequestSpan::new(KIND, "execute_key_request");

		self.metrics.record_attempt(KIND);

		let result = span
			.instrument(async move {
				let prepared =
					request::build_key_request(&self.context, request, credentials, &self.headers)?;

				self.execute(KIND, &prepared.url, prepared.body.as_deref(), &prepared.headers)
					.await
			})
			.await;

		self.record(KIND, &result);

		result
	}

	/// Requests a device certificate from the provisioning server.
	///
	/// The exchange is an empty-bodied POST without key-request headers; 307/308 answers are
	/// followed the same way as for key requests.
	pub async fn execute_provision_request(
		&self,
		request: &ProvisionRequest,
	) -> Result<LicenseResponse> {
		const KIND: RequestKind = RequestKind::Provision;

		let span = RequestSpan::new(KIND, "execute_provision_request");

		self.metrics.record_attempt(KIND);

		let result = span
			.instrument(async move {
				let url = request::build_provision_request(request)?;

				self.execute(KIND, &url, None, &RequestHeaders::default()).await
			})
			.await;

		self.record(KIND, &result);

		result
	}

	async fn execute(
		&self,
		kind: RequestKind,
		url: &str,
		body: Option<&[u8]>,
		headers: &RequestHeaders,
	) -> Result<LicenseResponse> {
		let options = ExecuteOptions { max_redirects: self.context.max_manual_redirects(), kind };

		executor::execute_post(
			self.http_client.as_ref(),
			url,
			body,
			headers,
			options,
			Some(&self.metrics),
		)
		.await
	}

	fn record(&self, kind: RequestKind, result: &Result<LicenseResponse>) {
		match result {
			Ok(_) => self.metrics.record_success(kind),
			Err(e) => {
				obs::trace_failure(e);

				self.metrics.record_failure(kind);
			},
		}
	}
}
#[cfg(feature = "reqwest")]
impl LicenseClient<ReqwestHttpClient> {
	/// Creates a client backed by a reqwest transport with redirects disabled.
	pub fn new(context: LicenseRequestContext) -> Result<Self> {
		let http_client = ReqwestHttpClient::build(None)?;

		Ok(Self::with_http_client(context, http_client))
	}

	/// Creates a client from a configuration document, seeding the header store.
	pub fn from_config(config: &LicenseClientConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::build(config.request_timeout())?;

		Self::from_config_with_http_client(config, http_client)
	}
}
impl<C> LicenseClient<C>
where
	C: LicenseHttpClient,
{
	/// Creates a client from a configuration document using a custom connection factory.
	pub fn from_config_with_http_client(
		config: &LicenseClientConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let client = Self::with_http_client(config.context()?, http_client);

		for (name, value) in &config.headers {
			client.set_header(name, value)?;
		}

		Ok(client)
	}
}
impl<C> Clone for LicenseClient<C>
where
	C: ?Sized + LicenseHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			metrics: self.metrics.clone(),
			context: self.context.clone(),
			headers: self.headers.clone(),
			credentials: self.credentials.clone(),
		}
	}
}
impl<C> Debug for LicenseClient<C>
where
	C: ?Sized + LicenseHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LicenseClient")
			.field("context", &self.context)
			.field("headers", &self.headers.len())
			.field("credentials", &self.credentials.snapshot())
			.finish()
	}
}
