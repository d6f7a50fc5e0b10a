//! Server configuration from environment variables
//!
//! | Variable       | Default     |
//! |----------------|-------------|
//! | `HOST`         | `127.0.0.1` |
//! | `PORT`         | `5000`      |
//! | `ARTIFACT_DIR` | `artifacts` |
//! | `STATIC_DIR`   | `static`    |
//! | `DEBUG`        | off         |

use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub artifact_dir: PathBuf,
    pub static_dir: PathBuf,
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            debug: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source. Unset keys fall back to defaults;
    /// set-but-invalid `HOST`/`PORT` values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host
                .parse()
                .with_context(|| format!("Invalid HOST: {:?}", host))?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("Invalid PORT: {:?}", port))?;
        }
        if let Some(dir) = lookup("ARTIFACT_DIR") {
            config.artifact_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(debug) = lookup("DEBUG") {
            config.debug = matches!(
                debug.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "crop_recommender=debug,tower_http=debug,axum=debug,warn"
        } else {
            "crop_recommender=info,tower_http=info,warn"
        }
    }
}
