// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{RequestKind, RequestOutcome};

/// Records a request outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(kind: RequestKind, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"drm_license_request_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a manual redirect via the global metrics recorder (when enabled).
pub fn record_redirect(kind: RequestKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("drm_license_redirect_total", "kind" => kind.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}

/// Thread-safe per-client counters.
#[derive(Debug, Default)]
pub struct RequestMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	redirects: AtomicU64,
}
impl RequestMetrics {
	/// Returns the total number of key and provisioning attempts.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of exchanges that produced a response body.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed exchanges.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of manual redirects followed.
	pub fn redirects(&self) -> u64 {
		self.redirects.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self, kind: RequestKind) {
		self.attempts.fetch_add(1, Ordering::Relaxed);

		record_request_outcome(kind, RequestOutcome::Attempt);
	}

	pub(crate) fn record_success(&self, kind: RequestKind) {
		self.success.fetch_add(1, Ordering::Relaxed);

		record_request_outcome(kind, RequestOutcome::Success);
	}

	pub(crate) fn record_failure(&self, kind: RequestKind) {
		self.failure.fetch_add(1, Ordering::Relaxed);

		record_request_outcome(kind, RequestOutcome::Failure);
	}

	pub(crate) fn record_redirect(&self, kind: RequestKind) {
		self.redirects.fetch_add(1, Ordering::Relaxed);

		record_redirect(kind);
	}
}
