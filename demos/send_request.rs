//! Demonstrates the client against a mock SendPulse API: the first call issues a token and the
//! second reuses it.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use sendpulse_client::{ApiRequest, Client, ClientConfig, client::TOKEN_PATH};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let balance_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/balance").query_param("currency", "USD");
			then.status(200).body("{\"currency\":\"USD\",\"balance_currency\":12.5}");
		})
		.await;
	let config = ClientConfig::new("demo-client", "super-secret")
		.with_base_url(Url::parse(&server.base_url())?);
	let client = Client::new(config)?;
	let request = ApiRequest::get("/balance").param("currency", "USD");

	for _ in 0..2 {
		let body = client.execute(&request).await?;

		println!("Balance: {}.", String::from_utf8_lossy(&body));
	}

	token_mock.assert_calls_async(1).await;
	balance_mock.assert_calls_async(2).await;

	Ok(())
}
