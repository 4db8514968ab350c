#![allow(
    unused,
    reason = "Each test binary only uses part of the shared helpers"
)]

use httpmock::MockServer;
use royale_client_sdk::rate_limit::RateLimitHeaders;
use royale_client_sdk::{Client, Config};

pub const TOKEN: &str = "test-token";

pub const AUTH_HEADER: &str = "auth";

pub fn client(server: &MockServer) -> anyhow::Result<Client> {
    let config = Config::builder().host(server.base_url()).build();

    Ok(Client::with_config(TOKEN, config)?)
}

pub fn client_with_headers(
    server: &MockServer,
    headers: RateLimitHeaders,
) -> anyhow::Result<Client> {
    let config = Config::builder()
        .host(server.base_url())
        .rate_limit_headers(headers)
        .build();

    Ok(Client::with_config(TOKEN, config)?)
}
