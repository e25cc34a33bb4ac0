use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::Policy;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    /// Seed for the global default policy
    #[serde(default = "default_policy")]
    pub policy: Policy,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Shared storage for forensic artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    /// Root directory of the vault
    #[serde(default = "default_vault_dir")]
    pub dir: PathBuf,
    /// NDJSON forensic log, relative to `dir`
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Screenshot directory, relative to `dir`
    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            dir: default_vault_dir(),
            log_file: default_log_file(),
            screenshots_dir: default_screenshots_dir(),
        }
    }
}

impl VaultConfig {
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(&self.log_file)
    }

    pub fn screenshots_path(&self) -> PathBuf {
        self.dir.join(&self.screenshots_dir)
    }
}

fn default_vault_dir() -> PathBuf {
    PathBuf::from("vault")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("security_log.txt")
}

fn default_screenshots_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

fn default_policy() -> Policy {
    Policy {
        watch_paths: vec!["C:\\CanaryTest".to_string()],
        watch_files: Vec::new(),
        extensions: vec![".txt".to_string(), ".pdf".to_string(), ".docx".to_string()],
        auto_lock: false,
    }
}

/// Sensor-side settings
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the coordination API
    #[serde(default = "default_vault_url")]
    pub vault_url: String,
    /// Reported hostname (defaults to the OS hostname)
    #[serde(default)]
    pub hostname: Option<String>,
    /// Reported IP (defaults to the outbound interface address)
    #[serde(default)]
    pub ip: Option<String>,
    /// Control-loop cadence in seconds
    #[serde(default = "default_cycle_secs")]
    pub cycle_secs: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Watcher poll interval in milliseconds
    #[serde(default = "default_watch_poll_ms")]
    pub watch_poll_ms: u64,
    /// Paths containing any of these substrings are never wiped (case-sensitive)
    #[serde(default = "default_protected_markers")]
    pub protected_markers: Vec<String>,
    /// Where breach screenshots are written
    #[serde(default = "default_agent_screenshots_dir")]
    pub screenshots_dir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            vault_url: default_vault_url(),
            hostname: None,
            ip: None,
            cycle_secs: default_cycle_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            watch_poll_ms: default_watch_poll_ms(),
            protected_markers: default_protected_markers(),
            screenshots_dir: default_agent_screenshots_dir(),
        }
    }
}

fn default_vault_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_cycle_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    3
}

fn default_watch_poll_ms() -> u64 {
    1000
}

fn default_protected_markers() -> Vec<String> {
    vec!["Windows".to_string()]
}

fn default_agent_screenshots_dir() -> PathBuf {
    PathBuf::from("vault/screenshots")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives used when RUST_LOG is unset, e.g. "info,canary_mesh=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit console logs as JSON lines
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info,canary_mesh=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            vault: VaultConfig::default(),
            policy: default_policy(),
            agent: AgentConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("CANARY_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (CANARY_AGENT__VAULT_URL, etc.)
            .add_source(
                Environment::with_prefix("CANARY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("agent.protected_markers")
                    .with_list_parse_key("policy.watch_paths")
                    .with_list_parse_key("policy.extensions"),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.agent.cycle_secs == 0 {
            errors.push("agent.cycle_secs must be positive".to_string());
        }

        if self.agent.request_timeout_secs == 0 {
            errors.push("agent.request_timeout_secs must be positive".to_string());
        }

        if self.agent.request_timeout_secs > self.agent.cycle_secs {
            errors.push(
                "agent.request_timeout_secs should not exceed agent.cycle_secs".to_string(),
            );
        }

        if self.agent.watch_poll_ms == 0 {
            errors.push("agent.watch_poll_ms must be positive".to_string());
        }

        if self.agent.vault_url.trim().is_empty() {
            errors.push("agent.vault_url must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
