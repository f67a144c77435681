//! # Terminal Configuration
//!
//! Who is operating the register and where its services live.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     REGI_SERVICE_URL=http://10.0.0.5:8000                              │
//! │     REGI_POS_NO=91                                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/regi-pos/terminal.toml (Linux)                           │
//! │     ~/Library/Application Support/com.regi.pos/terminal.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     store "30", register "90", http://localhost:8000                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [terminal]
//! emp_code = "9999999999"
//! store_code = "30"
//! pos_no = "90"
//!
//! [service]
//! base_url = "http://localhost:8000"
//! request_timeout_secs = 10
//! lookup_retries = 2
//! initial_backoff_ms = 200
//! max_backoff_ms = 2000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use regi_core::TerminalIdentity;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Ledger column widths for the identifiers.
const EMP_CODE_MAX_LEN: usize = 10;
const STORE_CODE_MAX_LEN: usize = 5;
const POS_NO_MAX_LEN: usize = 3;

// =============================================================================
// Terminal Settings
// =============================================================================

/// Operator and register identifiers sent with every purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSettings {
    /// Operator (cashier) code.
    #[serde(default = "default_emp_code")]
    pub emp_code: String,

    /// Store code.
    #[serde(default = "default_store_code")]
    pub store_code: String,

    /// Register number within the store.
    #[serde(default = "default_pos_no")]
    pub pos_no: String,
}

fn default_emp_code() -> String {
    "9999999999".to_string()
}

fn default_store_code() -> String {
    "30".to_string()
}

fn default_pos_no() -> String {
    "90".to_string()
}

impl Default for TerminalSettings {
    fn default() -> Self {
        TerminalSettings {
            emp_code: default_emp_code(),
            store_code: default_store_code(),
            pos_no: default_pos_no(),
        }
    }
}

// =============================================================================
// Service Settings
// =============================================================================

/// Where the catalog and ledger live and how patiently to call them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Base URL shared by `/products/{code}` and `/purchase/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds). Applies to lookups and purchases.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Extra attempts for a lookup that failed transiently.
    /// Purchases are never retried.
    #[serde(default = "default_lookup_retries")]
    pub lookup_retries: u32,

    /// First delay between lookup attempts (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Cap on the delay between lookup attempts (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_lookup_retries() -> u32 {
    2
}

fn default_initial_backoff() -> u64 {
    200
}

fn default_max_backoff() -> u64 {
    2000
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            lookup_retries: default_lookup_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl ServiceSettings {
    /// Parses `base_url`.
    pub fn base_url(&self) -> ClientResult<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

// =============================================================================
// Terminal Config
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Identifiers passed through to the ledger.
    #[serde(default)]
    pub terminal: TerminalSettings,

    /// Remote catalog/ledger settings.
    #[serde(default)]
    pub service: ServiceSettings,
}

impl TerminalConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (terminal.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load terminal config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        check_identifier("emp_code", &self.terminal.emp_code, EMP_CODE_MAX_LEN)?;
        check_identifier("store_code", &self.terminal.store_code, STORE_CODE_MAX_LEN)?;
        check_identifier("pos_no", &self.terminal.pos_no, POS_NO_MAX_LEN)?;

        let url = self.service.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "Service URL must start with http:// or https://, got: {}",
                self.service.base_url
            )));
        }
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "Service URL cannot carry a path: {}",
                self.service.base_url
            )));
        }

        if self.service.request_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.service.initial_backoff_ms > self.service.max_backoff_ms {
            return Err(ClientError::InvalidConfig(
                "initial_backoff_ms must not exceed max_backoff_ms".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key/value source.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(code) = var("REGI_EMP_CODE") {
            debug!(emp_code = %code, "Overriding operator code from environment");
            self.terminal.emp_code = code;
        }

        if let Some(code) = var("REGI_STORE_CODE") {
            self.terminal.store_code = code;
        }

        if let Some(pos) = var("REGI_POS_NO") {
            self.terminal.pos_no = pos;
        }

        if let Some(url) = var("REGI_SERVICE_URL") {
            debug!(url = %url, "Overriding service URL from environment");
            self.service.base_url = url;
        }

        if let Some(timeout) = var("REGI_REQUEST_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.service.request_timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric REGI_REQUEST_TIMEOUT_SECS"),
            }
        }

        if let Some(retries) = var("REGI_LOOKUP_RETRIES") {
            match retries.parse::<u32>() {
                Ok(n) => self.service.lookup_retries = n,
                Err(_) => warn!(value = %retries, "Ignoring non-numeric REGI_LOOKUP_RETRIES"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "regi", "pos")
            .map(|dirs| dirs.config_dir().join("terminal.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The identity handed to a new session.
    pub fn identity(&self) -> TerminalIdentity {
        TerminalIdentity::new(
            self.terminal.emp_code.clone(),
            self.terminal.store_code.clone(),
            self.terminal.pos_no.clone(),
        )
    }

    /// Returns the service base URL as configured.
    pub fn service_url(&self) -> &str {
        &self.service.base_url
    }
}

fn check_identifier(field: &str, value: &str, max_len: usize) -> ClientResult<()> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidConfig(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(ClientError::InvalidConfig(format!(
            "{field} must be at most {max_len} characters, got {value:?}"
        )));
    }
    Ok(())
}
