//! Frontend configuration

use singularity_http::ClientConfig;
use web_sys::window;

/// Path of the API below the page origin
pub const API_PATH: &str = "/api";

/// Get the base URL for API calls
///
/// The web client is served from the same origin as the API.
pub fn api_base_url() -> String {
    let origin = window()
        .and_then(|window| window.location().origin().ok())
        .unwrap_or_default();
    format!("{origin}{API_PATH}")
}

/// Client settings for the page the app is running on
pub fn default_client_config() -> ClientConfig {
    let base_url = api_base_url();
    if base_url.starts_with("http") {
        ClientConfig::with_base_url(base_url)
    } else {
        ClientConfig::default()
    }
}
