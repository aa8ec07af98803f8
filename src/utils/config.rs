//! Configuration and constants for the scanner.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

/// Default timeout for RPC requests (whole-block traces can be slow)
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(300);

/// Current snapshot manifest schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Bulk block traces are capped to this many transactions
pub const BULK_TRACE_TX_CAP: usize = 30;

/// Attempts at `debug_traceBlockByNumber` before falling back to per-transaction traces
pub const TRACE_FETCH_ATTEMPTS: u32 = 2;

/// Delay between bulk trace attempts
pub const TRACE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Blocks between intermediate snapshots
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 100;

/// Default root directory for snapshots
pub const DEFAULT_RESULTS_DIR: &str = "./results";

/// Block scanned when no range is given
pub const DEFAULT_BLOCK: u64 = 11_443_817;

/// Dotenv file read at startup for endpoint variables
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Opcodes whose declared gasCost is an allocation rather than a consumption
pub const CALL_OPCODES: &[&str] = &["CALL", "DELEGATECALL", "STATICCALL"];

// Snapshot file names (compatible with previously written result directories)
pub const COUNT_FILE: &str = "opcodesDistribution.json";
pub const AVERAGE_FILE: &str = "averageOpcodesGasCost.json";
pub const MAX_FILE: &str = "maxOpcodesGasCost.json";
pub const MIN_FILE: &str = "minOpcodesGasCost.json";
pub const TOTAL_FILE: &str = "totalOpcodesGasCost.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Returns true for CALL, DELEGATECALL and STATICCALL
pub fn is_call_opcode(op: &str) -> bool {
    CALL_OPCODES.contains(&op)
}

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Base,
    Optimism,
}

impl Chain {
    /// Name used in snapshot paths and config files
    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Optimism => "optimism",
        }
    }

    /// Environment variable holding this chain's node endpoint
    pub fn endpoint_env_var(self) -> &'static str {
        match self {
            Self::Base => "BASE_RPC_URL",
            Self::Optimism => "OPTIMISM_RPC_URL",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional TOML config file
///
/// ```toml
/// [endpoints]
/// base = "http://localhost:8545"
/// optimism = "http://localhost:9545"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

impl EndpointConfig {
    /// Load endpoint configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileRead {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Endpoint for `chain`, if one is configured
    pub fn endpoint(&self, chain: Chain) -> Option<&str> {
        self.endpoints.get(chain.name()).map(String::as_str)
    }
}

/// Load `KEY=value` pairs from a dotenv file into the process environment
///
/// Variables that are already set keep their values.
///
/// # Returns
/// `true` if the file was loaded, `false` if it does not exist
///
/// # Errors
/// * `ConfigError::EnvFile` - the file exists but cannot be read or parsed
pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
    let path = path.as_ref();
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Resolve the node endpoint for `chain`.
///
/// Precedence: explicit override, then the chain's environment variable,
/// then the config file.
pub fn resolve_endpoint(
    chain: Chain,
    explicit: Option<&str>,
    file: Option<&EndpointConfig>,
) -> Result<String, ConfigError> {
    let env_value = std::env::var(chain.endpoint_env_var()).ok();
    pick_endpoint(chain, explicit, env_value.as_deref(), file)
}

fn pick_endpoint(
    chain: Chain,
    explicit: Option<&str>,
    env_value: Option<&str>,
    file: Option<&EndpointConfig>,
) -> Result<String, ConfigError> {
    explicit
        .or(env_value)
        .or_else(|| file.and_then(|f| f.endpoint(chain)))
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingEndpoint {
            chain: chain.name().to_string(),
            env_var: chain.endpoint_env_var().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config() -> EndpointConfig {
        let mut endpoints = BTreeMap::new();
        endpoints.insert("base".to_string(), "http://file-base:8545".to_string());
        EndpointConfig { endpoints }
    }

    #[test]
    fn test_call_opcodes() {
        assert!(is_call_opcode("CALL"));
        assert!(is_call_opcode("DELEGATECALL"));
        assert!(is_call_opcode("STATICCALL"));
        assert!(!is_call_opcode("CALLCODE"));
        assert!(!is_call_opcode("call"));
    }

    #[test]
    fn test_endpoint_precedence() {
        let file = file_config();
        let url = pick_endpoint(Chain::Base, Some("http://flag"), Some("http://env"), Some(&file));
        assert_eq!(url.unwrap(), "http://flag");

        let url = pick_endpoint(Chain::Base, None, Some("http://env"), Some(&file));
        assert_eq!(url.unwrap(), "http://env");

        let url = pick_endpoint(Chain::Base, None, None, Some(&file));
        assert_eq!(url.unwrap(), "http://file-base:8545");
    }

    #[test]
    fn test_missing_endpoint() {
        let file = file_config();
        let err = pick_endpoint(Chain::Optimism, None, Some("  "), Some(&file)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint { .. }));
        assert!(err.to_string().contains("OPTIMISM_RPC_URL"));
    }

    #[test]
    fn test_load_env_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".env");
        std::fs::write(&path, "OPCODE_GAS_SCAN_ENV_CHECK=http://dotenv:8545\n").unwrap();

        assert!(load_env_file(&path).unwrap());
        assert_eq!(
            std::env::var("OPCODE_GAS_SCAN_ENV_CHECK").unwrap(),
            "http://dotenv:8545"
        );
    }

    #[test]
    fn test_missing_env_file_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(!load_env_file(temp_dir.path().join(".env")).unwrap());
    }

    #[test]
    fn test_malformed_env_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(".env");
        std::fs::write(&path, "this is not a dotenv line\n").unwrap();

        assert!(matches!(
            load_env_file(&path),
            Err(ConfigError::EnvFile { .. })
        ));
    }

    #[test]
    fn test_parse_endpoint_file() {
        let config: EndpointConfig = toml::from_str(
            r#"
            [endpoints]
            optimism = "http://op:9545"
            "#,
        )
        .unwrap();
        assert_eq!(config.endpoint(Chain::Optimism), Some("http://op:9545"));
        assert_eq!(config.endpoint(Chain::Base), None);
    }
}
