// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use drm_license_client::{
	_preludet::*,
	credentials::SessionCredentials,
	error::TransportError,
	request::{DEFAULT_CONTENT_TYPE, KeyRequest, ProvisionRequest},
};

const CHALLENGE: [u8; 6] = [0x08, 0x04, 0x12, 0x80, 0xff, 0x00];

#[tokio::test]
async fn key_request_posts_json_envelope_with_merged_headers() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.url("/license"), false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/license")
				.header("content-type", DEFAULT_CONTENT_TYPE)
				.header("x-api-key", "api-key-1")
				.json_body(json!({
					"token": "session-token",
					"drm_info": [8, 4, 18, 128, 255, 0],
					"kid": "kid-1"
				}));
			then.status(200).body("license-bytes");
		})
		.await;

	client.set_header("X-Api-Key", "api-key-1").expect("Header should be accepted.");
	client.set_token("session-token");
	client.set_key_id("kid-1");

	let response = client
		.execute_key_request(&KeyRequest::new(CHALLENGE))
		.await
		.expect("Key request should succeed.");

	assert_eq!(response.body, b"license-bytes");
	assert_eq!(response.redirects, 0);

	mock.assert_async().await;
}

#[tokio::test]
async fn stored_content_type_replaces_default() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.url("/license"), false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/license").header("content-type", "application/json");
			then.status(200).body("ok");
		})
		.await;

	client.set_header("Content-Type", "application/json").expect("Header should be accepted.");
	client
		.execute_key_request_with(&KeyRequest::new([1]), &SessionCredentials::new("t", "k"))
		.await
		.expect("Key request should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn request_url_and_forced_default() {
	let server = MockServer::start_async().await;
	let default = server
		.mock_async(|when, then| {
			when.method(POST).path("/default");
			then.status(200).body("default");
		})
		.await;
	let embedded = server
		.mock_async(|when, then| {
			when.method(POST).path("/embedded");
			then.status(200).body("embedded");
		})
		.await;
	let request = KeyRequest::new([1, 2]).with_license_server_url(server.url("/embedded"));
	let relaxed = build_reqwest_test_client(&server.url("/default"), false);
	let forced = build_reqwest_test_client(&server.url("/default"), true);

	assert_eq!(
		relaxed.execute_key_request(&request).await.expect("Embedded URL should answer.").body,
		b"embedded"
	);
	assert_eq!(
		forced.execute_key_request(&request).await.expect("Default URL should answer.").body,
		b"default"
	);
	assert_eq!(
		relaxed
			.execute_key_request(&KeyRequest::new([3]).with_license_server_url(""))
			.await
			.expect("Empty embedded URL should fall back.")
			.body,
		b"default"
	);

	embedded.assert_calls_async(1).await;
	default.assert_calls_async(2).await;
}

#[tokio::test]
async fn post_redirect_chain_is_followed_with_same_body() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.url("/proxy"), false);
	let body = json!({ "token": "t", "drm_info": [9, 9], "kid": "k" });
	let first = server
		.mock_async(|when, then| {
			when.method(POST).path("/proxy").json_body(body.clone());
			then.status(307).header("Location", server.url("/edge"));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(POST).path("/edge").json_body(body.clone());
			then.status(308).header("Location", "/origin");
		})
		.await;
	let last = server
		.mock_async(|when, then| {
			when.method(POST).path("/origin").json_body(body.clone());
			then.status(200).body("license");
		})
		.await;

	client.set_credentials(SessionCredentials::new("t", "k"));

	let response = client
		.execute_key_request(&KeyRequest::new([9, 9]))
		.await
		.expect("Redirect chain should be followed.");

	assert_eq!(response.body, b"license");
	assert_eq!(response.redirects, 2);
	assert_eq!(response.url.path(), "/origin");

	first.assert_async().await;
	second.assert_async().await;
	last.assert_async().await;
}

#[tokio::test]
async fn redirect_loop_stops_after_budget() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.url("/loop"), false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/loop");
			then.status(308).header("Location", server.url("/loop"));
		})
		.await;
	let err = client
		.execute_key_request(&KeyRequest::new([1]))
		.await
		.expect_err("Redirect loops must be cut off.");

	assert!(matches!(err, Error::RedirectExhausted { max_redirects: 5, status: 308, .. }));

	mock.assert_calls_async(6).await;
}

#[tokio::test]
async fn error_status_carries_diagnostics() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.url("/license"), false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/license");
			then.status(403).header("X-Reason", "token-expired").body("{\"error\":\"expired\"}");
		})
		.await;
	let err = client
		.execute_key_request(&KeyRequest::new([1]))
		.await
		.expect_err("403 should surface as an error.");

	match err {
		Error::HttpStatus { status, headers, body, url } => {
			assert_eq!(status, 403);
			assert_eq!(headers.first("x-reason"), Some("token-expired"));
			assert_eq!(body, b"{\"error\":\"expired\"}");
			assert_eq!(url, server.url("/license"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	mock.assert_async().await;
	assert_eq!(client.metrics().failures(), 1);
}

#[tokio::test]
async fn provisioning_posts_signed_request_in_query() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.url("/license"), false);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/provision")
				.query_param("key", "device-key")
				.query_param("signedRequest", "CAESsignedPayload");
			then.status(200).body("device-certificate");
		})
		.await;

	client.set_header("X-Api-Key", "not-for-provisioning").expect("Header should be accepted.");

	let response = client
		.execute_provision_request(&ProvisionRequest::new(
			server.url("/provision?key=device-key"),
			"CAESsignedPayload",
		))
		.await
		.expect("Provisioning should succeed.");

	assert_eq!(response.into_body(), b"device-certificate");

	mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
	let client = build_reqwest_test_client("http://127.0.0.1:1/license", false);
	let err = client
		.execute_key_request(&KeyRequest::new([1]))
		.await
		.expect_err("Nothing listens on port 1.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}

#[tokio::test]
async fn concurrent_key_requests_redirect_independently() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(&server.url("/proxy"), false);
	let proxy = server
		.mock_async(|when, then| {
			when.method(POST).path("/proxy");
			then.status(307).header("Location", server.url("/origin"));
		})
		.await;
	let origin = server
		.mock_async(|when, then| {
			when.method(POST).path("/origin");
			then.status(200).body("license");
		})
		.await;
	let first = KeyRequest::new([1]);
	let second = KeyRequest::new([2]);
	let (a, b) =
		tokio::join!(client.execute_key_request(&first), client.execute_key_request(&second));

	assert_eq!(a.expect("First request should succeed.").redirects, 1);
	assert_eq!(b.expect("Second request should succeed.").redirects, 1);

	proxy.assert_calls_async(2).await;
	origin.assert_calls_async(2).await;
	assert_eq!(client.metrics().successes(), 2);
}
