//! Shared key-request header store.
//!
//! Hosts mutate the store from their control path while key requests merge it on the
//! request path. A single [`Mutex`] guards the whole map, so every mutation and every
//! snapshot observes a consistent state.

// self
use crate::{_prelude::*, request::RequestHeaders};

type HeaderMap = Arc<Mutex<BTreeMap<String, String>>>;

/// Thread-safe header set merged into every key request.
///
/// Clones share the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct KeyRequestHeaders(HeaderMap);
impl KeyRequestHeaders {
	/// Adds or replaces a header. Names compare case-insensitively.
	pub fn set(&self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<()> {
		let (name, value) = (name.as_ref(), value.as_ref());

		validate_name(name)?;
		validate_value(value)?;

		let mut guard = self.0.lock();

		guard.retain(|key, _| !key.eq_ignore_ascii_case(name));
		guard.insert(name.to_owned(), value.to_owned());

		Ok(())
	}

	/// Removes a header, returning its previous value.
	pub fn clear(&self, name: impl AsRef<str>) -> Result<Option<String>> {
		let name = name.as_ref();

		validate_name(name)?;

		let mut guard = self.0.lock();
		let key = guard.keys().find(|key| key.eq_ignore_ascii_case(name)).cloned();

		Ok(key.and_then(|key| guard.remove(&key)))
	}

	/// Removes every header.
	pub fn clear_all(&self) {
		self.0.lock().clear();
	}

	/// Returns a consistent copy of the current header set.
	pub fn snapshot(&self) -> BTreeMap<String, String> {
		self.0.lock().clone()
	}

	/// Copies every header into `headers`, replacing same-named entries, under one lock.
	pub fn merge_into(&self, headers: &mut RequestHeaders) {
		let guard = self.0.lock();

		for (name, value) in guard.iter() {
			headers.insert(name, value);
		}
	}

	/// Number of stored headers.
	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	/// Returns `true` when the store is empty.
	pub fn is_empty(&self) -> bool {
		self.0.lock().is_empty()
	}
}

fn validate_name(name: &str) -> Result<()> {
	if name.trim().is_empty() {
		return Err(Error::invalid_argument("header name", "must not be empty"));
	}
	// RFC 7230 token characters.
	if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)) {
		return Err(Error::invalid_argument("header name", "must be an HTTP token"));
	}

	Ok(())
}

fn validate_value(value: &str) -> Result<()> {
	if value.chars().any(|c| c.is_control() && c != '\t') {
		return Err(Error::invalid_argument("header value", "must not contain control characters"));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn set_replaces_case_insensitively() {
		let store = KeyRequestHeaders::default();

		store.set("Content-Type", "application/json").expect("Header should be accepted.");
		store.set("content-type", "application/octet-stream").expect("Header should be accepted.");

		let snapshot = store.snapshot();

		assert_eq!(snapshot.len(), 1);
		assert_eq!(
			snapshot.get("content-type").map(String::as_str),
			Some("application/octet-stream")
		);
	}

	#[test]
	fn clear_and_clear_all_remove_entries() {
		let store = KeyRequestHeaders::default();

		store.set("X-Api-Key", "abc").expect("Header should be accepted.");
		store.set("X-Device", "tv").expect("Header should be accepted.");

		assert_eq!(store.clear("x-api-key").expect("Name should be valid."), Some("abc".into()));
		assert_eq!(store.clear("X-Missing").expect("Name should be valid."), None);
		assert_eq!(store.len(), 1);

		store.clear_all();

		assert!(store.is_empty());
	}

	#[test]
	fn invalid_names_and_values_are_rejected() {
		let store = KeyRequestHeaders::default();

		for name in ["", "   ", "X Api", "X-Api:", "X-Api\r\n"] {
			assert!(matches!(
				store.set(name, "v"),
				Err(Error::InvalidArgument { argument: "header name", .. })
			));
		}

		assert!(matches!(
			store.set("X-Api", "v\r\nX-Injected: 1"),
			Err(Error::InvalidArgument { argument: "header value", .. })
		));
		assert!(matches!(store.clear(""), Err(Error::InvalidArgument { .. })));
		assert!(store.set("X-Empty", "").is_ok());
		assert!(store.set("X-Tabbed", "a\tb").is_ok());
	}
}
