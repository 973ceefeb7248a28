use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Child indices from 2^31 up are hardened in BIP32, so derived accounts stop
/// below it.
pub const MAX_DERIVATION_LIMIT: u32 = 0x8000_0000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Could not parse config '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WalletConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sled,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: String,
}

/// Cost parameters for the password KDFs and wallet policy limits
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// PBKDF2-HMAC-SHA256 rounds used when sealing new secrets
    #[serde(default = "default_kdf_rounds")]
    pub kdf_rounds: u32,
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
    /// How many accounts may be derived from the recovery phrase
    #[serde(default = "default_derivation_limit")]
    pub derivation_limit: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_kdf_rounds() -> u32 {
    100_000
}

fn default_argon2_memory_kib() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_min_password_len() -> usize {
    8
}

fn default_derivation_limit() -> u32 {
    10
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sled,
            path: "./data/wallet".to_string(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            kdf_rounds: default_kdf_rounds(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            min_password_len: default_min_password_len(),
            derivation_limit: default_derivation_limit(),
        }
    }
}

impl SecurityConfig {
    /// Cheap parameters for tests
    pub fn insecure_for_tests() -> Self {
        Self {
            kdf_rounds: 1_000,
            argon2_memory_kib: 256,
            argon2_iterations: 1,
            ..Self::default()
        }
    }

    /// `derivation_limit` clamped to the non-hardened index range
    pub fn max_derived_accounts(&self) -> u32 {
        self.derivation_limit.min(MAX_DERIVATION_LIMIT)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            storage: StorageConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl WalletConfig {
    /// Load the config file, writing out defaults when it does not exist.
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if !std::path::Path::new(path).exists() {
            info!("Config file not found at '{}'. Creating default.", path);
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                if let Err(e) = std::fs::write(path, s) {
                    warn!("Could not write default config to '{}': {}", path, e);
                }
            }
            return Ok(config);
        }

        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&s).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        if config.security.derivation_limit > MAX_DERIVATION_LIMIT {
            warn!(
                "derivation_limit {} is past the non-hardened range, using {}",
                config.security.derivation_limit, MAX_DERIVATION_LIMIT
            );
        }
        info!("Config loaded from {}", path);
        Ok(config)
    }
}
