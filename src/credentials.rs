//! Session credentials embedded in license request envelopes.

// self
use crate::_prelude::*;

/// Redacted DRM token wrapper keeping the session token out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrmToken(String);
impl DrmToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for DrmToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for DrmToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("DrmToken").field(&"<redacted>").finish()
	}
}
impl Display for DrmToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Token and key id pair sent with every key request.
///
/// Either half may be unset; unset values travel as JSON `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCredentials {
	/// Playback token issued by the content backend.
	pub token: Option<DrmToken>,
	/// Key id of the content being licensed.
	pub key_id: Option<String>,
}
impl SessionCredentials {
	/// Creates a fully populated pair.
	pub fn new(token: impl Into<String>, key_id: impl Into<String>) -> Self {
		Self { token: Some(DrmToken::new(token)), key_id: Some(key_id.into()) }
	}

	/// Replaces the token.
	pub fn with_token(mut self, token: impl Into<String>) -> Self {
		self.token = Some(DrmToken::new(token));

		self
	}

	/// Replaces the key id.
	pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
		self.key_id = Some(key_id.into());

		self
	}
}

/// Credentials slot shared between the host's control path and request futures.
///
/// One [`RwLock`] guards both halves, so [`set`](Self::set) is atomic with respect to
/// [`snapshot`](Self::snapshot).
#[derive(Clone, Debug, Default)]
pub(crate) struct CredentialsSlot(Arc<RwLock<SessionCredentials>>);
impl CredentialsSlot {
	pub(crate) fn snapshot(&self) -> SessionCredentials {
		self.0.read().clone()
	}

	pub(crate) fn set(&self, credentials: SessionCredentials) {
		*self.0.write() = credentials;
	}

	pub(crate) fn set_token(&self, token: DrmToken) {
		self.0.write().token = Some(token);
	}

	pub(crate) fn set_key_id(&self, key_id: String) {
		self.0.write().key_id = Some(key_id);
	}
}
