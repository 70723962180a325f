//! Optional observability helpers for license exchanges.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `drm_license.request` with the `kind`
//!   (key or provision) and `stage` (call site) fields, plus redirect and failure events.
//! - Enable `metrics` to increment the `drm_license_request_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`, and `drm_license_redirect_total`
//!   for every manual redirect followed.
//!
//! [`RequestMetrics`] is always available and counts outcomes per client.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Exchange kinds issued by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
	/// License (key) request.
	Key,
	/// Device provisioning request.
	Provision,
}
impl RequestKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestKind::Key => "key",
			RequestKind::Provision => "provision",
		}
	}
}
impl Display for RequestKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
