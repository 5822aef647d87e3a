//! Server configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "tempfiles";
pub const DEFAULT_UPLOAD_MAX_BYTES: u64 = 32 * 1024 * 1024;
pub const DEFAULT_PAGE_IDLE_SECS: u64 = 1800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub upload_dir: PathBuf,
    /// `None` accepts uploads of any size.
    pub upload_max_bytes: Option<u64>,
    pub page_idle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            upload_max_bytes: Some(DEFAULT_UPLOAD_MAX_BYTES),
            page_idle: Duration::from_secs(DEFAULT_PAGE_IDLE_SECS),
        }
    }
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `UPLOAD_DIR`: default `tempfiles`
    /// - `UPLOAD_MAX_BYTES`: default 33554432, `0` disables the limit
    /// - `PAGE_IDLE_SECS`: default 1800
    ///
    /// Invalid values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
        let upload_dir = lookup("UPLOAD_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR), PathBuf::from);
        let upload_max_bytes = match parse_or(&lookup, "UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES) {
            0 => None,
            n => Some(n),
        };
        let page_idle = Duration::from_secs(parse_or(&lookup, "PAGE_IDLE_SECS", DEFAULT_PAGE_IDLE_SECS));

        Self { port, upload_dir, upload_max_bytes, page_idle }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
