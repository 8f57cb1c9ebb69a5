use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FIXTURES_DIR: &str = "responses";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),

    #[error("invalid HOST value {0:?}")]
    InvalidHost(String),
}

/// Startup configuration for the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,

    /// Verbose logging and per-request tracing
    pub debug: bool,

    /// Directory holding the `response*.json` fixtures
    pub fixtures_dir: PathBuf,

    /// Root of the static frontend; must contain `index.html`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            debug: false,
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl ServerConfig {
    /// Build the config from `HOST`, `PORT`, `DEBUG`, `FIXTURES_DIR` and `STATIC_DIR`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost(raw))?,
            None => defaults.host,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let debug = lookup("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false);

        Ok(Self {
            host,
            port,
            debug,
            fixtures_dir: lookup("FIXTURES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.fixtures_dir),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "server=debug,tower_http=debug"
        } else {
            "server=info,tower_http=info"
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr(), SocketAddr::from(([127, 0, 0, 1], 5000)));
        assert!(!config.debug);
        assert_eq!(config.fixtures_dir, PathBuf::from("responses"));
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.log_filter(), "server=info,tower_http=info");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("DEBUG", "True"),
            ("FIXTURES_DIR", "/srv/fixtures"),
            ("STATIC_DIR", "web"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(config.debug);
        assert_eq!(config.fixtures_dir, PathBuf::from("/srv/fixtures"));
        assert_eq!(config.static_dir, PathBuf::from("web"));
    }

    #[test]
    fn test_debug_flag_values() {
        for value in ["1", "yes", "ON"] {
            assert!(config_from(&[("DEBUG", value)]).unwrap().debug);
        }
        for value in ["0", "false", "", "nope"] {
            assert!(!config_from(&[("DEBUG", value)]).unwrap().debug);
        }
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "five thousand")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));

        let err = config_from(&[("PORT", "70000")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(_)));
    }

    #[test]
    fn test_invalid_host() {
        let err = config_from(&[("HOST", "localhost:5000")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHost(_)));
    }
}
