//! POST executor with bounded manual redirect handling.
//!
//! HTTP stacks refuse to replay a POST body on 307/308 answers, yet license servers are
//! commonly fronted by proxies that answer exactly that. The executor follows such
//! redirects itself: it opens a fresh connection per hop, re-sends the same body and
//! headers to the `Location` target, and gives up once the redirect budget is spent.

// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::{HttpExchange, HttpResponse, LicenseConnection, LicenseHttpClient},
	obs::{self, RequestKind, RequestMetrics},
	request::RequestHeaders,
};

/// Response body returned by a successful exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LicenseResponse {
	/// Response body, handed to the content-protection module as-is.
	pub body: Vec<u8>,
	/// URL that finally answered with a 2xx status.
	pub url: Url,
	/// Manual redirects followed to get there.
	pub redirects: u8,
}
impl LicenseResponse {
	/// Consumes the response and returns the raw body.
	pub fn into_body(self) -> Vec<u8> {
		self.body
	}
}

/// Parameters shared by every hop of one exchange.
#[derive(Clone, Copy, Debug)]
pub struct ExecuteOptions {
	/// Manual redirect budget.
	pub max_redirects: u8,
	/// Kind label used for logs and metrics.
	pub kind: RequestKind,
}

/// Posts `body` to `url`, following up to `options.max_redirects` 307/308 answers.
///
/// Each hop uses its own connection, which is released before the next hop starts or the
/// call returns.
pub async fn execute_post<C>(
	http_client: &C,
	url: &str,
	body: Option<&[u8]>,
	headers: &RequestHeaders,
	options: ExecuteOptions,
	metrics: Option<&RequestMetrics>,
) -> Result<LicenseResponse>
where
	C: ?Sized + LicenseHttpClient,
{
	let mut url = Url::parse(url).map_err(|source| ConfigError::invalid_url(url, source))?;
	let mut redirects = 0_u8;

	if let Some(body) = body {
		obs::trace_payload("license request body", body);
	}

	loop {
		let mut connection = http_client.open();

		for (name, value) in headers.iter() {
			connection.set_header(name, value);
		}

		let exchange = HttpExchange::new(url.clone(), body.map(<[u8]>::to_vec));
		let response = connection.post(exchange).await.map_err(TransportError::network)?;

		if response.is_success() {
			obs::trace_payload("license response body", &response.body);

			return Ok(LicenseResponse { body: response.body, url, redirects });
		}
		if !response.is_method_preserving_redirect() {
			return Err(status_error(url, response));
		}
		if redirects >= options.max_redirects {
			return Err(Error::RedirectExhausted {
				max_redirects: options.max_redirects,
				status: response.status,
				url: url.into(),
			});
		}

		let Some(location) = response
			.headers
			.first("Location")
			.filter(|location| !location.trim().is_empty())
			.map(str::to_owned)
		else {
			return Err(status_error(url, response));
		};
		let next = url
			.join(&location)
			.map_err(|source| TransportError::InvalidRedirect { location, source })?;

		redirects += 1;

		obs::trace_redirect(&url, &next, response.status, redirects);

		if let Some(metrics) = metrics {
			metrics.record_redirect(options.kind);
		}

		url = next;
	}
}

fn status_error(url: Url, response: HttpResponse) -> Error {
	let HttpResponse { status, headers, body } = response;

	Error::HttpStatus { status, url: url.into(), headers, body }
}
