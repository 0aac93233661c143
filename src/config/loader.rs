//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{Config, HandlerKind, Writer};
use crate::config::validation::validate_config;
use crate::error::ConfigError;

/// Parse a configuration file. `.json` files are read as JSON, anything else
/// as TOML.
fn parse_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config: Config = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}

/// Load and validate configuration from a file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = parse_file(path)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load configuration from an optional file, then apply `LOGGER_*`
/// environment overrides, then validate.
pub fn load_config_with_env(path: Option<&Path>) -> Result<Config, ConfigError> {
    let base = match path {
        Some(p) => parse_file(p)?,
        None => Config::default(),
    };
    let config = apply_env(base, |var| std::env::var(var).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` returns the value of an environment variable, if set.
pub fn apply_env<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("LOGGER_LEVEL") {
        config.level = v;
    }
    if let Some(v) = lookup("LOGGER_ADD_SOURCE") {
        config.add_source = parse_bool("LOGGER_ADD_SOURCE", v)?;
    }
    if let Some(v) = lookup("LOGGER_IS_JSON") {
        config.is_json = parse_bool("LOGGER_IS_JSON", v)?;
    }
    if let Some(v) = lookup("LOGGER_WRITER") {
        config.writer = match v.as_str() {
            "stderr" => Writer::Stderr,
            "stdout" => Writer::Stdout,
            "file" => Writer::File,
            _ => return Err(ConfigError::Env { var: "LOGGER_WRITER", value: v }),
        };
    }
    if let Some(v) = lookup("LOGGER_OUT_PATH") {
        config.out_path = v;
    }
    if let Some(v) = lookup("LOGGER_SET_DEFAULT") {
        config.set_default = parse_bool("LOGGER_SET_DEFAULT", v)?;
    }
    if let Some(v) = lookup("LOGGER_TYPE") {
        config.kind = match v.as_str() {
            "dev" => HandlerKind::Dev,
            "pretty" => HandlerKind::Pretty,
            "discard" => HandlerKind::Discard,
            "default" => HandlerKind::Default,
            _ => return Err(ConfigError::Env { var: "LOGGER_TYPE", value: v }),
        };
    }
    Ok(config)
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::Env { var, value }),
    }
}
