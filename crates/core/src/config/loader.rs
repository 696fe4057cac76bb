use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment variable overrides, e.g. `SHOWTIME_RETRY__MAX_ATTEMPTS`.
pub const ENV_PREFIX: &str = "SHOWTIME_";

/// Load configuration from file with environment variable overrides.
///
/// Files ending in `.json` are read as JSON, everything else as TOML.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let figment = if is_json {
        Figment::new().merge(Json::file(path))
    } else {
        Figment::new().merge(Toml::file(path))
    };

    let config: Config = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
