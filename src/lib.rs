//! DRM license acquisition client: JSON key-request envelopes, session token injection,
//! shared key-request headers, and bounded manual 307/308 redirect following for POST license
//! and provisioning exchanges.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod context;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod headers;
pub mod http;
pub mod obs;
pub mod request;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::ReqwestLicenseClient, context::LicenseRequestContext, http::ReqwestHttpClient,
	};

	/// Builds a reqwest transport with redirects disabled, as the executor expects.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::build(Some(std::time::Duration::from_secs(10)))
			.expect("Failed to build Reqwest client for tests.")
	}

	/// Constructs a reqwest-backed [`ReqwestLicenseClient`] pointed at `default_license_url`.
	pub fn build_reqwest_test_client(
		default_license_url: &str,
		force_default_license_url: bool,
	) -> ReqwestLicenseClient {
		let context = LicenseRequestContext::builder(default_license_url)
			.force_default_license_url(force_default_license_url)
			.build()
			.expect("Failed to build license request context for tests.");

		ReqwestLicenseClient::with_http_client(context, test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
