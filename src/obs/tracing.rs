// self
use crate::{_prelude::*, obs::RequestKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided request kind + stage.
	pub fn new(kind: RequestKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("drm_license.request", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a manual redirect hop.
pub(crate) fn trace_redirect(from: &Url, to: &Url, status: u16, hop: u8) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%from, %to, status, hop, "following license server redirect");
	#[cfg(not(feature = "tracing"))]
	let _ = (from, to, status, hop);
}

/// Logs a failed exchange.
pub(crate) fn trace_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(status = error.status(), %error, "license exchange failed");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs payload bytes at trace level.
pub(crate) fn trace_payload(label: &'static str, bytes: &[u8]) {
	#[cfg(feature = "tracing")]
	tracing::trace!(len = bytes.len(), bytes = %crate::request::HexDump(bytes), "{label}");
	#[cfg(not(feature = "tracing"))]
	let _ = (label, bytes);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = RequestSpan::new(RequestKind::Key, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn trace_helpers_accept_any_input() {
		let url = Url::parse("https://license.example.com/").expect("Fixture URL should parse.");

		trace_redirect(&url, &url, 308, 1);
		trace_payload("license", &[0x01, 0x02]);
		trace_failure(&Error::invalid_argument("header name", "must not be empty"));
	}
}
