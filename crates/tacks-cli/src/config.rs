//! Environment-based API configuration.

use std::env;

/// Endpoint and credentials for one board.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub email: String,
    pub token: String,
}

/// Read API configuration from the environment.
///
/// Requires `TACKS_API_URL` and `TACKS_API_TOKEN`; `TACKS_USER_EMAIL` is
/// optional and only labels the session.
pub fn api_config_from_env() -> Option<ApiConfig> {
    let base_url = env::var("TACKS_API_URL").ok()?;
    let token = env::var("TACKS_API_TOKEN").ok()?;

    if base_url.is_empty() || token.is_empty() {
        return None;
    }

    Some(ApiConfig {
        base_url,
        email: env::var("TACKS_USER_EMAIL").unwrap_or_default(),
        token,
    })
}
