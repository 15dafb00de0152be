use anyhow::{Context, Result};
use analyzer::conf::ParserConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    pub bind_address: String,
    pub request_timeout_secs: u64,
    /// Upper bound on a whole multipart upload
    pub max_upload_bytes: usize,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File { path: String },
}

/// Parsed-result retention
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Oldest sessions are evicted beyond this count
    pub max_sessions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_sessions: 16 }
    }
}

const CONFIG_PATHS: [&str; 3] = [
    "/etc/tablog/server",
    "config/server",
    "crates/server/config/server",
];

impl ServerConfig {
    /// Load configuration from server.toml and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::load_from(&CONFIG_PATHS, "TABLOG")
    }

    /// Layer defaults, then the first-found files in `paths`, then
    /// `<prefix>_SECTION__KEY` environment variables.
    pub fn load_from(paths: &[&str], env_prefix: &str) -> Result<Self> {
        let defaults = config::Config::try_from(&ServerConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder().add_source(defaults);

        for path in paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Single underscore after the prefix, double for nesting:
        // TABLOG_SERVER__BIND_ADDRESS
        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .context("Invalid bind_address")?;

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be > 0");
        }
        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("server.max_upload_bytes must be > 0");
        }
        if self.sessions.max_sessions == 0 {
            anyhow::bail!("sessions.max_sessions must be > 0");
        }

        self.parser.validate().context("Invalid parser section")?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: HttpConfig {
                bind_address: "0.0.0.0:3001".to_string(),
                request_timeout_secs: 120,
                max_upload_bytes: 1024 * 1024 * 1024,
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:5000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            logging: LoggingConfig {
                level: "info,server=debug,analyzer=info".to_string(),
                format: LogFormat::Pretty,
                output: LogOutput::Stdout,
            },
            sessions: SessionConfig::default(),
            parser: ParserConfig::default(),
        }
    }
}
