use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL of the marketplace API
    #[arg(long, env = "API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Per-request timeout for API calls, in seconds
    #[arg(long, env = "API_TIMEOUT_SECS")]
    pub api_timeout_secs: Option<u64>,

    /// Where the signed-in session is persisted
    #[arg(long, env = "SESSION_PATH")]
    pub session_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session storage backend.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Persist to [`SessionConfig::path`], surviving restarts.
    File,
    /// Keep in process memory only.
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub storage: SessionBackend,
    pub path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Resolve configuration.
    ///
    /// Priority: CLI flag (or its env var) > `RENEWHIRE_` env > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.static_dir", "static")?
            .set_default("api.base_url", "http://localhost:5000")?
            .set_default("api.timeout_secs", 15)?
            .set_default("session.storage", "file")?
            .set_default("session.path", "renewhire-session.json")?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        }

        // E.g. RENEWHIRE_API__BASE_URL=https://api.example.com
        builder = builder.add_source(
            Environment::with_prefix("RENEWHIRE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = cli.api_base_url {
            builder = builder.set_override("api.base_url", url)?;
        }
        if let Some(secs) = cli.api_timeout_secs {
            builder = builder
                .set_override("api.timeout_secs", i64::try_from(secs).unwrap_or(i64::MAX))?;
        }
        if let Some(path) = cli.session_path {
            builder = builder.set_override("session.path", path)?;
        }

        let cfg: AppConfig = builder.build()?.try_deserialize()?;
        if cfg.api.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(cfg)
    }
}
