// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

/// Which `UserRepository` implementation backs the user endpoints
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// Document store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub collection: String,
    pub connect_timeout_secs: u64,
}

impl StoreConfig {
    /// Build the `mongodb://` connection string.
    ///
    /// Credentials are left out entirely when no username is configured.
    pub fn connection_uri(&self) -> String {
        if self.username.is_empty() {
            format!("mongodb://{}:{}/{}", self.host, self.port, self.database)
        } else {
            format!(
                "mongodb://{}:{}@{}:{}/{}",
                self.username, self.password, self.host, self.port, self.database
            )
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level written to any sink (error, warn, info, debug)
    pub level: String,
    /// Value of the `service` field on every record
    pub service: String,
    /// Mirror records to stdout/stderr
    pub console: bool,
    /// Errors-only sink (disabled if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
    /// All-levels sink (disabled if not set)
    #[serde(default)]
    pub combined_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}
