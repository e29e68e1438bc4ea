//! CLI configuration utilities

use anyhow::Result;
use singularity_http::ClientConfig;
use std::path::{Path, PathBuf};

/// Name of the optional settings file inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Name of the file holding the persistent session values
pub const SESSION_FILE: &str = "session.json";

/// Resolve the data directory
///
/// An explicit path wins, then `SINGULARITY_STATE_DIR`, then the platform
/// data directory.
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        if let Ok(state_dir) = std::env::var("SINGULARITY_STATE_DIR") {
            PathBuf::from(state_dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("singularity")
        }
    })
}

/// Load client settings from defaults, `<data_dir>/config.toml` and `SINGULARITY_*` variables
pub fn load_client_config(data_dir: &Path) -> Result<ClientConfig> {
    let defaults = ClientConfig::default();

    let settings = config::Config::builder()
        .set_default("base_url", defaults.base_url)?
        .set_default("timeout_secs", defaults.timeout_secs)?
        .set_default("token_lifetime_secs", defaults.token_lifetime_secs)?
        .set_default("login_path", defaults.login_path)?
        .add_source(config::File::from(data_dir.join(CONFIG_FILE)).required(false))
        .add_source(config::Environment::with_prefix("SINGULARITY"))
        .build()?;

    let client_config: ClientConfig = settings.try_deserialize()?;
    client_config.validate()?;
    Ok(client_config)
}
