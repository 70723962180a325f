//! Demonstrates requesting a license from a server configured through a JSON document.
//!
//! 1. Parse a [`LicenseClientConfig`] (the default URL, redirect budget, timeout, and seed
//!    headers).
//! 2. Build a reqwest-backed client with [`ReqwestLicenseClient::from_config`].
//! 3. Store the session token and key id, then post a key request.
//! 4. Inspect the failure kind when the server cannot be reached or refuses the request.

// crates.io
use color_eyre::Result;
// self
use drm_license_client::{
	client::ReqwestLicenseClient,
	context::LicenseClientConfig,
	credentials::SessionCredentials,
	error::Error,
	request::{HexDump, KeyRequest},
};

const CONFIG: &str = r#"{
	"default_license_url": "https://license.example.com/widevine",
	"max_manual_redirects": 5,
	"request_timeout_ms": 5000,
	"headers": { "X-Client": "fetch-license-demo" }
}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = LicenseClientConfig::from_json_str(CONFIG)?;
	let client = ReqwestLicenseClient::from_config(&config)?;

	client.set_credentials(SessionCredentials::new("demo-playback-token", "demo-key-id"));

	let challenge = vec![0x08, 0x04, 0x12, 0x10, 0xde, 0xad, 0xbe, 0xef];

	println!("Posting key request {} to {}.", HexDump(&challenge), config.default_license_url);

	match client.execute_key_request(&KeyRequest::new(challenge)).await {
		Ok(license) => println!(
			"Received a {}-byte license from {} after {} redirects.",
			license.body.len(),
			license.url,
			license.redirects
		),
		Err(Error::HttpStatus { status, url, .. }) =>
			println!("License server {url} refused the request with status {status}."),
		Err(Error::RedirectExhausted { max_redirects, url, .. }) =>
			println!("Gave up at {url} after {max_redirects} redirects."),
		Err(e) => println!("License request failed: {e}."),
	}

	Ok(())
}
