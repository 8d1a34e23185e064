//! Config file parsing and validation.
//!
//! The config file is made of `key=value` lines. Empty lines and lines
//! starting with `#` are ignored, as are unknown keys.

use crate::api_defaults::DEFAULT_TIMEOUT_SECONDS;
use crate::error::{AddContext, CacheError};
use crate::time::Seconds;
use crate::Result;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

lazy_static! {
    static ref CONFIG_LINE: regex::Regex =
        regex::Regex::new(r"^(?P<key>\w+)\s*=\s*(?P<value>.*)$").unwrap();
}

pub trait ConfigProperties: Send + Sync {
    /// Directory where responses are persisted. `None` if not configured.
    fn cache_location(&self) -> Option<&str>;
    fn mark_cached_responses(&self) -> bool {
        true
    }
    fn compress_cache(&self) -> bool {
        true
    }
    fn timeout(&self) -> Seconds {
        Seconds::new(DEFAULT_TIMEOUT_SECONDS)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    cache_location: Option<String>,
    mark_cached_responses: bool,
    compress_cache: bool,
    timeout: Seconds,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_location: None,
            mark_cached_responses: true,
            compress_cache: true,
            timeout: Seconds::new(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl Config {
    pub fn new<T: Read>(reader: T) -> Result<Self> {
        let data = Config::parse(reader)?;
        let mut config = Config::default();
        if let Some(location) = data.get("cache_location").filter(|l| !l.is_empty()) {
            config.cache_location = Some(location.to_string());
        }
        if let Some(mark) = data.get("mark_cached_responses") {
            config.mark_cached_responses = parse_bool("mark_cached_responses", mark)?;
        }
        if let Some(compress) = data.get("compress_cache") {
            config.compress_cache = parse_bool("compress_cache", compress)?;
        }
        if let Some(timeout) = data.get("timeout") {
            config.timeout = Seconds::try_from(timeout.as_str()).err_context(
                CacheError::ConfigurationError(format!(
                    "Invalid timeout {timeout}. Use a number followed by s, m, h or d."
                )),
            )?;
        }
        Ok(config)
    }

    /// Overrides the cache location, e.g. with a default when the config file
    /// has none.
    pub fn set_cache_location<T: Into<String>>(&mut self, location: T) {
        self.cache_location = Some(location.into());
    }

    fn parse<T: Read>(mut reader: T) -> Result<HashMap<String, String>> {
        let mut config_data = String::new();
        reader.read_to_string(&mut config_data)?;
        let mut config = HashMap::new();
        for line in config_data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(captured) = CONFIG_LINE.captures(line) {
                config.insert(
                    captured["key"].to_string(),
                    captured["value"].trim().to_string(),
                );
            }
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(CacheError::ConfigurationError(format!(
            "{key} must be true or false, got {value}"
        ))
        .into()),
    }
}

impl ConfigProperties for Config {
    fn cache_location(&self) -> Option<&str> {
        self.cache_location.as_deref()
    }

    fn mark_cached_responses(&self) -> bool {
        self.mark_cached_responses
    }

    fn compress_cache(&self) -> bool {
        self.compress_cache
    }

    fn timeout(&self) -> Seconds {
        self.timeout
    }
}

impl ConfigProperties for Arc<Config> {
    fn cache_location(&self) -> Option<&str> {
        self.as_ref().cache_location()
    }

    fn mark_cached_responses(&self) -> bool {
        self.as_ref().mark_cached_responses()
    }

    fn compress_cache(&self) -> bool {
        self.as_ref().compress_cache()
    }

    fn timeout(&self) -> Seconds {
        self.as_ref().timeout()
    }
}
