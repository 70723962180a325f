//! Request builder for license and provisioning exchanges.
//!
//! Key requests become a JSON envelope `{"token", "drm_info", "kid"}` where `drm_info` lists
//! the raw challenge bytes as integers. Provisioning requests become a bare URL with the
//! signed request appended as a query value.

// self
use crate::{
	_prelude::*,
	context::LicenseRequestContext,
	credentials::SessionCredentials,
	error::EncodingError,
	headers::KeyRequestHeaders,
};

/// Content type sent with key requests unless the header store overrides it.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Key request produced by the content-protection module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyRequest {
	/// Opaque challenge bytes.
	pub data: Vec<u8>,
	/// License server URL embedded in the media, if any.
	pub license_server_url: Option<String>,
}
impl KeyRequest {
	/// Creates a request without an embedded license URL.
	pub fn new(data: impl Into<Vec<u8>>) -> Self {
		Self { data: data.into(), license_server_url: None }
	}

	/// Sets the embedded license URL.
	pub fn with_license_server_url(mut self, url: impl Into<String>) -> Self {
		self.license_server_url = Some(url.into());

		self
	}
}

/// Provisioning request produced by the content-protection module.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisionRequest {
	/// Provisioning server URL, usually already carrying a query string.
	pub default_url: String,
	/// Signed request, expected to be UTF-8 text.
	pub data: Vec<u8>,
}
impl ProvisionRequest {
	/// Creates a provisioning request.
	pub fn new(default_url: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
		Self { default_url: default_url.into(), data: data.into() }
	}
}

/// Wire envelope posted to the license server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LicensePayload<'a> {
	/// Session token.
	pub token: Option<&'a str>,
	/// Challenge bytes as unsigned integers, in order.
	pub drm_info: &'a [u8],
	/// Key id.
	pub kid: Option<&'a str>,
}
impl<'a> LicensePayload<'a> {
	/// Borrows the challenge and credentials into an envelope.
	pub fn new(data: &'a [u8], credentials: &'a SessionCredentials) -> Self {
		Self {
			token: credentials.token.as_ref().map(|token| token.expose()),
			drm_info: data,
			kid: credentials.key_id.as_deref(),
		}
	}

	/// Serializes the envelope as UTF-8 JSON.
	pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
		serde_json::to_vec(self).map_err(|e| EncodingError::from(e).into())
	}
}

/// Request header list with case-insensitive replacement and stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestHeaders(Vec<(String, String)>);
impl RequestHeaders {
	/// Headers every key request starts from.
	pub fn key_request_defaults() -> Self {
		let mut headers = Self::default();

		headers.insert("Content-Type", DEFAULT_CONTENT_TYPE);

		headers
	}

	/// Inserts a header, replacing any entry whose name matches case-insensitively.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();

		self.0.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
		self.0.push((name, value.into()));
	}

	/// Looks up a header value case-insensitively.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
	}

	/// Iterates over the headers in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Number of headers.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no header is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Fully assembled exchange, ready for the executor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
	/// Target URL text, parsed by the executor.
	pub url: String,
	/// POST body; `None` posts an empty body.
	pub body: Option<Vec<u8>>,
	/// Request headers.
	pub headers: RequestHeaders,
}

/// Builds the license exchange for a key request.
pub fn build_key_request(
	context: &LicenseRequestContext,
	request: &KeyRequest,
	credentials: &SessionCredentials,
	store: &KeyRequestHeaders,
) -> Result<PreparedRequest> {
	let url = context.effective_license_url(request.license_server_url.as_deref()).to_owned();
	let mut headers = RequestHeaders::key_request_defaults();

	store.merge_into(&mut headers);

	let body = LicensePayload::new(&request.data, credentials).to_json_bytes()?;

	Ok(PreparedRequest { url, body: Some(body), headers })
}

/// Builds the provisioning URL `<default_url>&signedRequest=<data>`.
///
/// The signed request is appended verbatim without percent-encoding, which is what
/// provisioning servers expect. Characters such as `&` or `#` inside the data would
/// therefore change the meaning of the URL.
pub fn build_provision_request(request: &ProvisionRequest) -> Result<String> {
	let signed = std::str::from_utf8(&request.data)
		.map_err(|source| EncodingError::ProvisionData { source })?;

	Ok(format!("{}&signedRequest={signed}", request.default_url))
}

/// Formats bytes as `[ 0x0A 0xFF ]` for diagnostics.
#[derive(Clone, Copy)]
pub struct HexDump<'a>(pub &'a [u8]);
impl Display for HexDump<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("[ ")?;

		for byte in self.0 {
			write!(f, "0x{byte:02X} ")?;
		}

		f.write_str("]")
	}
}
impl Debug for HexDump<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(self, f)
	}
}
